//! 接続の死活判定
//!
//! 判定そのものは副作用のない関数にしておき、Registry のロック内から呼ぶ。

use std::time::Duration;

use super::{entity::Session, value_object::Timestamp};

/// 死活判定のしきい値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessPolicy {
    /// 無通信がこれを超えたら probe を送る
    pub idle_threshold: Duration,
    /// probe の応答待ちがこれを超えたら切断する
    pub ack_timeout: Duration,
}

impl LivenessPolicy {
    pub fn new(idle_threshold: Duration, ack_timeout: Duration) -> Self {
        Self {
            idle_threshold,
            ack_timeout,
        }
    }
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(60))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessVerdict {
    /// 何もしない（通信中、または probe の応答待ち）
    Healthy,
    /// LivenessProbe を送る
    Probe,
    /// 切断する
    Evict,
}

fn as_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// セッション 1 件の死活判定
pub fn assess(session: &Session, now: Timestamp, policy: &LivenessPolicy) -> LivenessVerdict {
    match session.pending_probe {
        Some(sent_at) => {
            if now.millis_since(sent_at) > as_millis(policy.ack_timeout) {
                LivenessVerdict::Evict
            } else {
                LivenessVerdict::Healthy
            }
        }
        None => {
            if now.millis_since(session.last_activity_at) > as_millis(policy.idle_threshold) {
                LivenessVerdict::Probe
            } else {
                LivenessVerdict::Healthy
            }
        }
    }
}
