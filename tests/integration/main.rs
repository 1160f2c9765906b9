//! Integration Tests
//!
//! Exercise the HTTP API end to end against an in-process server.

mod test_timer_api;

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use dorofi::api::create_router;
use dorofi::services::time_provider::MockTimeProvider;
use dorofi::services::timer_service::TimerServiceOptions;
use dorofi::{TimerService, TimerSettings};

/// Server on a fixed clock whose tick schedule never fires during a test
pub fn create_test_server(settings: TimerSettings) -> (TestServer, MockTimeProvider) {
    let clock = MockTimeProvider::new_from_ymd_hms(2025, 6, 2, 8, 30, 0).unwrap();
    let timer_service = TimerService::with_clock(
        settings,
        Arc::new(clock.clone()),
        TimerServiceOptions {
            tick_interval: Duration::from_secs(3600),
            ..TimerServiceOptions::default()
        },
    )
    .unwrap();

    let server = TestServer::new(create_router(timer_service, &[])).unwrap();
    (server, clock)
}
