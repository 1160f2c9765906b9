//! Dorofi timer server
//!
//! Serves the timer API and logs the events that the notification and sync
//! collaborators act on.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use dorofi::api;
use dorofi::config::Config;
use dorofi::logging;
use dorofi::models::timer_event::TimerEvent;
use dorofi::services::time_provider::SystemTimeProvider;
use dorofi::services::timer_service::TimerService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    logging::init_logging(
        Some(&config.log_level),
        config.json_logs || config.is_production(),
    );
    logging::log_startup();
    config.log_config();

    let timer_service = TimerService::with_clock(
        config.timer.clone(),
        Arc::new(SystemTimeProvider::new()),
        config.service_options(),
    )?;
    spawn_event_listener(timer_service.clone());

    let app = api::create_router(timer_service, &config.cors_origins);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Dorofi timer listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dorofi timer stopped");
    Ok(())
}

/// Log phase and session events the way the notification and sync
/// collaborators would consume them
fn spawn_event_listener(timer_service: TimerService) {
    let mut events = timer_service.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event @ TimerEvent::PhaseCompleted { .. }) => {
                    let Ok(settings) = timer_service.settings() else {
                        warn!("Timer state unavailable; skipping notification");
                        continue;
                    };
                    if let Some(cue) = event.notification_type() {
                        info!(
                            cue = cue.display_name(),
                            message = cue.default_message(),
                            notify = settings.notifications,
                            sound = settings.sound_enabled,
                            "Phase change notification"
                        );
                    }
                }
                Ok(TimerEvent::SessionCompleted {
                    session_id,
                    mode,
                    duration_seconds,
                    completed_at,
                }) => {
                    info!(
                        session_id = %session_id,
                        mode = %mode,
                        duration_seconds,
                        completed_at = %completed_at,
                        "Session completed; ready for sync"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event listener fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(error = %error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
