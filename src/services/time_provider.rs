//! Time Provider Trait and Implementations
//!
//! Wall-clock abstraction so the drift corrector and expected-end bookkeeping
//! can run against system time in production and a controllable clock in tests.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// Trait for providing wall-clock time
pub trait TimeProvider: Send + Sync {
    /// Get the current UTC time
    fn now_utc(&self) -> DateTime<Utc>;

    /// Get current Unix timestamp in milliseconds
    fn now_timestamp_millis(&self) -> i64 {
        self.now_utc().timestamp_millis()
    }
}

/// System time provider for production use
#[derive(Debug, Clone, Default)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock time provider for testing
///
/// Clones share the same clock, so a test can keep a handle and advance time
/// underneath an engine or service that owns another clone.
#[derive(Debug, Clone)]
pub struct MockTimeProvider {
    current_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockTimeProvider {
    /// Create a new mock time provider starting from the given time
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start_time)),
        }
    }

    /// Create a mock time provider starting from now
    pub fn new_from_now() -> Self {
        Self::new(Utc::now())
    }

    /// Create a mock time provider starting from a specific date/time
    pub fn new_from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self::new)
    }

    /// Set the current mock time
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        *self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = new_time;
    }

    /// Advance the mock time by the specified duration
    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *time += duration;
    }

    pub fn advance_millis(&self, millis: i64) {
        self.advance(chrono::Duration::milliseconds(millis));
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.advance(chrono::Duration::seconds(seconds));
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.advance(chrono::Duration::minutes(minutes));
    }

    /// Get the current mock time
    pub fn current_time(&self) -> DateTime<Utc> {
        *self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockTimeProvider {
    fn default() -> Self {
        Self::new_from_now()
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_utc(&self) -> DateTime<Utc> {
        self.current_time()
    }
}
