use dorofi::TimerSettings;
use serde_json::{json, Value};

use crate::create_test_server;

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _) = create_test_server(TimerSettings::default());

    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_get_timer_endpoint() {
    let (server, _) = create_test_server(TimerSettings::default());

    let response = server.get("/api/timer").await;
    assert_eq!(response.status_code(), 200);

    let timer: Value = response.json();
    assert!(timer.get("id").is_some());
    assert_eq!(timer["mode"], "Work");
    assert_eq!(timer["time_left_seconds"], 1500);
    assert_eq!(timer["is_running"], false);
    assert_eq!(timer["sessions_until_long_break"], 4);
    assert!(timer["expected_end_timestamp"].is_null());
}

#[tokio::test]
async fn test_start_and_pause_endpoints() {
    let (server, clock) = create_test_server(TimerSettings::default());

    let started: Value = server.post("/api/timer/start").await.json();
    assert_eq!(started["is_running"], true);
    assert_eq!(
        started["expected_end_timestamp"],
        clock.current_time().timestamp_millis() + 1_500_000
    );

    // Starting again changes nothing
    let again: Value = server.post("/api/timer/start").await.json();
    assert_eq!(again["expected_end_timestamp"], started["expected_end_timestamp"]);

    let paused: Value = server.post("/api/timer/pause").await.json();
    assert_eq!(paused["is_running"], false);
    assert!(paused["expected_end_timestamp"].is_null());
}

#[tokio::test]
async fn test_skip_and_reset_endpoints() {
    let (server, _) = create_test_server(TimerSettings::default());

    let skipped: Value = server.post("/api/timer/skip").await.json();
    assert_eq!(skipped["mode"], "ShortBreak");
    assert_eq!(skipped["time_left_seconds"], 300);
    assert_eq!(skipped["sessions_completed"], 1);

    server.post("/api/timer/start").await;
    let reset: Value = server.post("/api/timer/reset").await.json();
    assert_eq!(reset["mode"], "ShortBreak");
    assert_eq!(reset["time_left_seconds"], 300);
    assert_eq!(reset["is_running"], false);
}

#[tokio::test]
async fn test_visibility_corrects_drift() {
    let (server, clock) = create_test_server(TimerSettings::default());
    server.post("/api/timer/start").await;

    clock.advance_seconds(60);
    let response = server
        .post("/api/timer/visibility")
        .json(&json!({ "visible": true }))
        .await;
    assert_eq!(response.status_code(), 200);

    let outcome: Value = response.json();
    assert_eq!(outcome["correction"]["status"], "corrected");
    assert_eq!(outcome["correction"]["previous"], 1500);
    assert_eq!(outcome["correction"]["corrected"], 1440);
    assert_eq!(outcome["timer"]["time_left_seconds"], 1440);
}

#[tokio::test]
async fn test_visibility_small_drift_ignored() {
    let (server, clock) = create_test_server(TimerSettings::default());
    server.post("/api/timer/start").await;

    clock.advance_seconds(2);
    let outcome: Value = server
        .post("/api/timer/visibility")
        .json(&json!({ "visible": true }))
        .await
        .json();
    assert_eq!(outcome["correction"]["status"], "within_tolerance");
    assert_eq!(outcome["timer"]["time_left_seconds"], 1500);
}

#[tokio::test]
async fn test_visibility_hidden_is_noop() {
    let (server, clock) = create_test_server(TimerSettings::default());
    server.post("/api/timer/start").await;

    clock.advance_seconds(60);
    let outcome: Value = server
        .post("/api/timer/visibility")
        .json(&json!({ "visible": false }))
        .await
        .json();
    assert_eq!(outcome["correction"]["status"], "not_applicable");
    assert_eq!(outcome["timer"]["time_left_seconds"], 1500);
}

#[tokio::test]
async fn test_visibility_without_flag_is_rejected() {
    let (server, _) = create_test_server(TimerSettings::default());

    let response = server
        .post("/api/timer/visibility")
        .json(&json!({ "hidden": true }))
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"], "BadRequest");
}
