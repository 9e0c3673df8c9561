//! Reconnection policy of the client.

use std::time::Duration;

use crate::error::ClientError;

/// How often and how long the client keeps retrying a lost connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    /// Whether `error` ends the client for good.
    ///
    /// A rejected username would be rejected again, so it is never retried.
    pub fn is_fatal(error: &ClientError) -> bool {
        matches!(error, ClientError::UsernameRejected(_))
    }

    /// Whether another connection attempt should be made after `failures` failed sessions
    pub fn should_retry(&self, error: &ClientError, failures: u32) -> bool {
        !Self::is_fatal(error) && failures < self.max_attempts
    }
}
