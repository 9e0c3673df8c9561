//! HTTP でトレンドを取得する TrendSource 実装
//!
//! `GET {endpoint}?id={woeid}` を呼び、Twitter `trends/place` 形式
//! （`[{"trends": [{"name": "..."}]}]`）のレスポンスからトピック名を取り出す。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{TrendLocation, TrendSource, TrendSourceError};

/// 1 リクエストあたりのタイムアウト
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TrendsPlace {
    #[serde(default)]
    trends: Vec<Trend>,
}

#[derive(Debug, Deserialize)]
struct Trend {
    name: String,
}

fn extract_trend_names(places: Vec<TrendsPlace>) -> Vec<String> {
    places
        .into_iter()
        .flat_map(|place| place.trends)
        .map(|trend| trend.name)
        .collect()
}

pub struct HttpTrendSource {
    endpoint: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl HttpTrendSource {
    pub fn new(endpoint: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bearer_token,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl TrendSource for HttpTrendSource {
    async fn fetch(&self, location: &TrendLocation) -> Result<Vec<String>, TrendSourceError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("id", location.woeid)]);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Fetching trends from {} (woeid={})", self.endpoint, location.woeid);
        let response = request
            .send()
            .await
            .map_err(|e| TrendSourceError::RemoteUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrendSourceError::RemoteUnavailable(format!(
                "unexpected status {}",
                status
            )));
        }

        let places = response
            .json::<Vec<TrendsPlace>>()
            .await
            .map_err(|e| TrendSourceError::RemoteUnavailable(e.to_string()))?;

        Ok(extract_trend_names(places))
    }
}
