//! トレンド取得の外部依存

use std::time::Duration;

use async_trait::async_trait;

use super::TrendSourceError;

/// 外部 API を呼んでよい最小間隔（1 分あたり 4 リクエスト）
pub const MIN_TRENDS_FETCH_INTERVAL: Duration = Duration::from_secs(15);

/// トレンドの取得地点（Yahoo! WOEID）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendLocation {
    pub woeid: u64,
}

impl TrendLocation {
    /// ロンドン
    pub const DEFAULT_WOEID: u64 = 44418;

    pub fn new(woeid: u64) -> Self {
        Self { woeid }
    }
}

impl Default for TrendLocation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WOEID)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// トレンドのトピック名を人気順で返す
    async fn fetch(&self, location: &TrendLocation) -> Result<Vec<String>, TrendSourceError>;
}
