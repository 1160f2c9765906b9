//! Unit Tests
//!
//! Behavioural tests for the timer engine, its settings and the service that
//! owns them, driven through the public crate API.

mod test_timer_service;
mod test_timer_settings;

use std::sync::Arc;

use dorofi::services::time_provider::MockTimeProvider;
use dorofi::{TimerEngine, TimerMode, TimerSession, TimerSettings};

/// Clock fixed at a known instant
pub fn test_clock() -> MockTimeProvider {
    MockTimeProvider::new_from_ymd_hms(2025, 6, 2, 8, 30, 0).unwrap()
}

pub fn engine_with(settings: TimerSettings) -> (TimerEngine, MockTimeProvider) {
    let clock = test_clock();
    let engine = TimerEngine::new(settings, Arc::new(clock.clone())).unwrap();
    (engine, clock)
}

/// Engine resumed in `mode` with `time_left_seconds` remaining
pub fn engine_at(
    mode: TimerMode,
    time_left_seconds: u32,
    running: bool,
) -> (TimerEngine, MockTimeProvider) {
    let settings = TimerSettings::default();
    let mut session = TimerSession::new(mode, settings.duration_seconds(mode));
    session.time_left_seconds = time_left_seconds;
    session.is_running = running;

    let clock = test_clock();
    let engine = TimerEngine::restore(session, settings, Arc::new(clock.clone())).unwrap();
    (engine, clock)
}
