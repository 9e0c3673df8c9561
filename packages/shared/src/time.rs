//! Time-related utilities with clock abstraction for testability.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{FixedOffset, TimeZone, Utc};

/// JST is UTC+9
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        current_timestamp_millis()
    }
}

/// Manually driven clock.
///
/// Starts at a given timestamp and only moves when `advance` or `set` is called,
/// which lets timer-driven logic (idle detection, probe timeouts) be tested
/// without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Move the clock forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to JST RFC 3339 format
///
/// Out-of-range timestamps fall back to the UTC epoch rendering of `0`.
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> String {
    let Some(jst_offset) = FixedOffset::east_opt(JST_OFFSET_SECS) else {
        return Utc.timestamp_millis_opt(timestamp_millis).single().map_or_else(
            || "1970-01-01T00:00:00+00:00".to_string(),
            |dt| dt.to_rfc3339(),
        );
    };
    jst_offset
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .map_or_else(
            || "1970-01-01T09:00:00+09:00".to_string(),
            |dt| dt.to_rfc3339(),
        )
}
