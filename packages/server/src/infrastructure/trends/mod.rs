//! TrendSource 実装

pub mod fixed;
pub mod http;

pub use fixed::{DEFAULT_TOPICS, StaticTrendSource};
pub use http::HttpTrendSource;
