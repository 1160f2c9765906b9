use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;

use dorofi::models::timer_event::TimerEvent;
use dorofi::services::timer_engine::TimerEngineError;
use dorofi::services::timer_service::{TimerServiceError, TimerServiceOptions};
use dorofi::{TimerMode, TimerService, TimerSettings};

use crate::{engine_at, test_clock};

fn service(settings: TimerSettings) -> TimerService {
    TimerService::with_clock(
        settings,
        Arc::new(test_clock()),
        TimerServiceOptions::default(),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_tick_interval() {
    let timer_service = TimerService::with_clock(
        TimerSettings::default(),
        Arc::new(test_clock()),
        TimerServiceOptions {
            tick_interval: Duration::from_millis(100),
            ..TimerServiceOptions::default()
        },
    )
    .unwrap();

    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    assert_eq!(timer_service.snapshot().unwrap().time_left_seconds, 1490);
}

#[tokio::test(start_paused = true)]
async fn test_pause_then_start_does_not_double_tick() {
    let timer_service = service(TimerSettings::default());

    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    timer_service.pause().unwrap();
    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    // One tick before the pause, two after the restart
    assert_eq!(timer_service.snapshot().unwrap().time_left_seconds, 1497);
}

#[tokio::test(start_paused = true)]
async fn test_reset_stops_ticking() {
    let timer_service = service(TimerSettings::default());
    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    let snapshot = timer_service.reset().unwrap();
    assert_eq!(snapshot.time_left_seconds, 1500);
    assert!(!snapshot.is_running);
    assert!(!timer_service.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn test_skip_while_running_publishes_and_stops() {
    let timer_service = service(TimerSettings::default());
    let mut events = timer_service.subscribe();

    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    let snapshot = timer_service.skip().unwrap();

    assert_eq!(snapshot.mode, TimerMode::ShortBreak);
    assert_eq!(snapshot.sessions_completed, 1);
    assert!(!timer_service.is_ticking());

    match events.recv().await.unwrap() {
        TimerEvent::SessionCompleted {
            duration_seconds, ..
        } => assert_eq!(duration_seconds, 10),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(events.recv().await.unwrap().kind(), "PhaseCompleted");
}

#[tokio::test(start_paused = true)]
async fn test_restored_running_engine_ticks_immediately() {
    let (engine, _) = engine_at(TimerMode::Work, 100, true);
    let timer_service = TimerService::from_engine(engine, &TimerServiceOptions::default());

    assert!(timer_service.is_running().unwrap());
    assert!(timer_service.is_ticking());

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(timer_service.snapshot().unwrap().time_left_seconds, 97);
}

#[tokio::test(start_paused = true)]
async fn test_restored_engine_runs_to_phase_end() {
    let (engine, _) = engine_at(TimerMode::Work, 3, true);
    let timer_service = TimerService::from_engine(engine, &TimerServiceOptions::default());

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let snapshot = timer_service.snapshot().unwrap();
    assert_eq!(snapshot.mode, TimerMode::ShortBreak);
    assert_eq!(snapshot.sessions_completed, 1);
    assert!(!timer_service.is_ticking());
}

#[test]
fn test_paused_engine_wraps_without_runtime() {
    let (engine, _) = engine_at(TimerMode::Work, 100, false);
    let timer_service = TimerService::from_engine(engine, &TimerServiceOptions::default());
    assert!(!timer_service.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn test_correction_past_phase_end_transitions_once() {
    let clock = test_clock();
    let timer_service = TimerService::with_clock(
        TimerSettings::default(),
        Arc::new(clock.clone()),
        TimerServiceOptions::default(),
    )
    .unwrap();
    let mut events = timer_service.subscribe();

    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    clock.advance_minutes(30);
    let outcome = timer_service.visibility_changed(true).unwrap();

    assert_eq!(outcome.timer.mode, TimerMode::ShortBreak);
    assert!(!timer_service.is_ticking());

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snapshot = timer_service.snapshot().unwrap();
    assert_eq!(snapshot.sessions_completed, 1);
    assert_eq!(snapshot.time_left_seconds, 300);

    assert_eq!(events.recv().await.unwrap().kind(), "SessionCompleted");
    assert_eq!(events.recv().await.unwrap().kind(), "PhaseCompleted");
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_correction_into_auto_started_phase_keeps_one_schedule() {
    let clock = test_clock();
    let timer_service = TimerService::with_clock(
        TimerSettings {
            auto_start_breaks: true,
            ..TimerSettings::default()
        },
        Arc::new(clock.clone()),
        TimerServiceOptions::default(),
    )
    .unwrap();
    let mut events = timer_service.subscribe();

    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    clock.advance_minutes(30);
    timer_service.visibility_changed(true).unwrap();
    assert!(timer_service.is_ticking());

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    let snapshot = timer_service.snapshot().unwrap();
    assert_eq!(snapshot.mode, TimerMode::ShortBreak);
    assert_eq!(snapshot.sessions_completed, 1);
    assert_eq!(snapshot.time_left_seconds, 298);

    assert_eq!(events.recv().await.unwrap().kind(), "SessionCompleted");
    assert_eq!(events.recv().await.unwrap().kind(), "PhaseCompleted");
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_skip_into_auto_started_phase_restarts_schedule() {
    let timer_service = service(TimerSettings {
        auto_start_breaks: true,
        ..TimerSettings::default()
    });

    timer_service.start().unwrap();
    tokio::time::sleep(Duration::from_millis(1_900)).await;
    timer_service.skip().unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(timer_service.snapshot().unwrap().time_left_seconds, 300);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(timer_service.snapshot().unwrap().time_left_seconds, 299);
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
    let timer_service = service(TimerSettings::default());

    let result = timer_service.apply_settings(TimerSettings {
        work_duration_minutes: 0,
        ..TimerSettings::default()
    });
    assert!(matches!(
        result,
        Err(TimerServiceError::Engine(TimerEngineError::InvalidSettings(_)))
    ));
    assert_eq!(timer_service.settings().unwrap(), TimerSettings::default());
}

#[test]
fn test_engine_restore_clamps_time_left() {
    let (engine, _) = engine_at(TimerMode::Work, 100_000, false);
    assert_eq!(engine.session().time_left_seconds, 1500);
}
