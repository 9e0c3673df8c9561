//! UseCase: トレンドとルーム一覧の突き合わせ
//!
//! 1 サイクル分の処理。周期実行は `ui::background` が担当する。
//!
//! - トレンド取得に失敗したサイクルは何も変更しない
//! - 空のルームのうちトレンドから外れたものだけを削除する
//! - メンバーがいるルームはトレンドから外れても残す

use std::{collections::HashSet, sync::Arc};

use hottopics_shared::time::Clock;

use crate::domain::{ChatroomRegistry, RoomName, Timestamp, TrendLocation, TrendSource};

use super::{Notifier, error::ReconcileError};

/// 1 サイクルで変更したルーム
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: Vec<RoomName>,
    pub removed: Vec<RoomName>,
}

/// トピック名を整形する（前後空白の除去、空の除外、重複は先勝ち）
fn normalize_topics(topics: Vec<String>) -> Vec<RoomName> {
    let mut seen = HashSet::new();
    topics
        .into_iter()
        .filter_map(|topic| RoomName::new(topic).ok())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

pub struct ReconcileRoomsUseCase {
    registry: Arc<dyn ChatroomRegistry>,
    trend_source: Arc<dyn TrendSource>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    location: TrendLocation,
}

impl ReconcileRoomsUseCase {
    pub fn new(
        registry: Arc<dyn ChatroomRegistry>,
        trend_source: Arc<dyn TrendSource>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
        location: TrendLocation,
    ) -> Self {
        Self {
            registry,
            trend_source,
            notifier,
            clock,
            location,
        }
    }

    pub async fn execute(&self) -> Result<ReconcileOutcome, ReconcileError> {
        let topics = self
            .trend_source
            .fetch(&self.location)
            .await
            .map_err(|e| ReconcileError::RemoteUnavailable(e.to_string()))?;

        let trending = normalize_topics(topics);
        if trending.is_empty() {
            return Err(ReconcileError::RemoteUnavailable(
                "trends source returned no topics".to_string(),
            ));
        }

        let mut outcome = ReconcileOutcome::default();
        let existing = self.registry.list_rooms().await;

        for room in &existing {
            if !trending.contains(&room.name) && self.registry.remove_room_if_empty(&room.name).await {
                outcome.removed.push(room.name.clone());
            }
        }

        let now = Timestamp::new(self.clock.now_millis());
        for name in trending {
            if self.registry.create_room(name.clone(), now).await {
                outcome.created.push(name);
            }
        }

        self.notifier.broadcast_room_list().await;
        Ok(outcome)
    }
}
