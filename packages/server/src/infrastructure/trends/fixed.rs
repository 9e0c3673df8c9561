//! 固定のトピック一覧を返す TrendSource 実装
//!
//! トレンド API のエンドポイントが設定されていない場合に使う。

use async_trait::async_trait;

use crate::domain::{TrendLocation, TrendSource, TrendSourceError};

/// エンドポイント未設定時の既定トピック
pub const DEFAULT_TOPICS: [&str; 5] = ["Rust", "Tokio", "WebAssembly", "OpenSource", "Music"];

#[derive(Debug, Clone)]
pub struct StaticTrendSource {
    topics: Vec<String>,
}

impl StaticTrendSource {
    pub fn new(topics: Vec<String>) -> Self {
        Self { topics }
    }
}

impl Default for StaticTrendSource {
    fn default() -> Self {
        Self::new(DEFAULT_TOPICS.iter().map(|topic| topic.to_string()).collect())
    }
}

#[async_trait]
impl TrendSource for StaticTrendSource {
    async fn fetch(&self, _location: &TrendLocation) -> Result<Vec<String>, TrendSourceError> {
        Ok(self.topics.clone())
    }
}
