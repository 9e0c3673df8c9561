//! サーバー設定
//!
//! コマンドライン引数（clap）から [`ServerConfig`] を組み立て、起動前に検証する。

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::domain::{LivenessPolicy, MIN_TRENDS_FETCH_INTERVAL, TrendLocation};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "reconcile interval must be at least {}s (got {}s)",
        MIN_TRENDS_FETCH_INTERVAL.as_secs(),
        .0.as_secs()
    )]
    ReconcileIntervalTooShort(Duration),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "hottopics-server")]
#[command(about = "Chat server with chatrooms for trending topics", long_about = None)]
pub struct ServerArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8025")]
    pub port: u16,

    /// Seconds between trend refreshes (minimum 15)
    #[arg(long, default_value = "300")]
    pub reconcile_interval_secs: u64,

    /// Seconds between connection health checks
    #[arg(long, default_value = "5")]
    pub health_check_interval_secs: u64,

    /// Seconds of silence before a client is probed
    #[arg(long, default_value = "60")]
    pub idle_threshold_secs: u64,

    /// Seconds to wait for a probe acknowledgement before disconnecting
    #[arg(long, default_value = "60")]
    pub ack_timeout_secs: u64,

    /// Trends API endpoint (Twitter `trends/place` compatible). Fixed topics are used when omitted
    #[arg(long)]
    pub trends_endpoint: Option<String>,

    /// Bearer token for the trends API
    #[arg(long)]
    pub trends_token: Option<String>,

    /// Yahoo! WOEID of the trend location
    #[arg(long, default_value_t = TrendLocation::DEFAULT_WOEID)]
    pub woeid: u64,

    /// Topics used when no trends endpoint is configured (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendsConfig {
    pub endpoint: Option<String>,
    pub bearer_token: Option<String>,
    pub woeid: u64,
    /// エンドポイント未設定時に使うトピック（空なら既定のトピック）
    pub fallback_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub reconcile_interval: Duration,
    pub health_check_interval: Duration,
    pub idle_threshold: Duration,
    pub ack_timeout: Duration,
    pub trends: TrendsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8025,
            reconcile_interval: Duration::from_secs(300),
            health_check_interval: Duration::from_secs(5),
            idle_threshold: Duration::from_secs(60),
            ack_timeout: Duration::from_secs(60),
            trends: TrendsConfig {
                endpoint: None,
                bearer_token: None,
                woeid: TrendLocation::DEFAULT_WOEID,
                fallback_topics: Vec::new(),
            },
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconcile_interval < MIN_TRENDS_FETCH_INTERVAL {
            return Err(ConfigError::ReconcileIntervalTooShort(
                self.reconcile_interval,
            ));
        }
        for (name, value) in [
            ("health check interval", self.health_check_interval),
            ("idle threshold", self.idle_threshold),
            ("ack timeout", self.ack_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(())
    }

    pub fn liveness_policy(&self) -> LivenessPolicy {
        LivenessPolicy::new(self.idle_threshold, self.ack_timeout)
    }

    pub fn trend_location(&self) -> TrendLocation {
        TrendLocation::new(self.trends.woeid)
    }
}

impl TryFrom<ServerArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: ServerArgs) -> Result<Self, Self::Error> {
        let config = Self {
            host: args.host,
            port: args.port,
            reconcile_interval: Duration::from_secs(args.reconcile_interval_secs),
            health_check_interval: Duration::from_secs(args.health_check_interval_secs),
            idle_threshold: Duration::from_secs(args.idle_threshold_secs),
            ack_timeout: Duration::from_secs(args.ack_timeout_secs),
            trends: TrendsConfig {
                endpoint: args.trends_endpoint.filter(|endpoint| !endpoint.is_empty()),
                bearer_token: args.trends_token.filter(|token| !token.is_empty()),
                woeid: args.woeid,
                fallback_topics: args.topics,
            },
        };
        config.validate()?;
        Ok(config)
    }
}
