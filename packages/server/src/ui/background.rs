//! 周期実行タスク（ルーム更新・死活監視）
//!
//! どちらも `tokio::time::interval` で駆動し、shutdown の watch チャンネルが
//! 変化したら（または送信側が破棄されたら）終了する。処理が周期より長引いた場合、
//! 取りこぼした tick はまとめて実行せずに捨てる。

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::usecase::{MonitorHealthUseCase, ReconcileRoomsUseCase};

/// ルーム更新タスクを起動する（初回は即時実行）
pub fn spawn_room_reconciler(
    usecase: Arc<ReconcileRoomsUseCase>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => match usecase.execute().await {
                    Ok(outcome) => tracing::info!(
                        "Rooms reconciled: {} created, {} removed",
                        outcome.created.len(),
                        outcome.removed.len()
                    ),
                    Err(e) => tracing::warn!("Skipping room reconciliation: {}", e),
                },
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!("Room reconciler stopped");
    })
}

/// 死活監視タスクを起動する
pub fn spawn_health_monitor(
    usecase: Arc<MonitorHealthUseCase>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sweep = usecase.execute().await;
                    if !sweep.evicted.is_empty() {
                        tracing::info!("Evicted {} unresponsive session(s)", sweep.evicted.len());
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!("Health monitor stopped");
    })
}
