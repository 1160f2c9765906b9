//! Logging configuration for Dorofi
//!
//! Structured logging setup and the domain-level log helpers used by the
//! timer service.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::models::timer_session::TimerMode;
use crate::models::timer_settings::SettingsField;

/// Filter used when neither `RUST_LOG` nor a configured level is present
pub const DEFAULT_FILTER: &str = "dorofi=info,tower_http=info";

/// Build the filter: `RUST_LOG` wins, then `level`, then [`DEFAULT_FILTER`]
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| match level {
            Some(level) => EnvFilter::try_new(format!("dorofi={level},tower_http={level}")),
            None => EnvFilter::try_new(DEFAULT_FILTER),
        })
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the application logging system
///
/// JSON output is meant for production log shipping; the compact console
/// format is the default. Calling this twice is harmless: the second global
/// subscriber is rejected and the first stays in place.
pub fn init_logging(level: Option<&str>, json: bool) {
    let layer = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .compact()
            .with_ansi(true)
            .boxed()
    };

    let result = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(layer)
        .try_init();

    if result.is_ok() {
        tracing::info!("Logging system initialized");
    }
}

/// Log application startup
pub fn log_startup() {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        git_commit = option_env!("GIT_COMMIT").unwrap_or("unknown"),
        build_time = option_env!("BUILD_TIME").unwrap_or("unknown"),
        "Dorofi timer starting up"
    );
}

/// Log a user-driven timer state change
pub fn log_timer_state_change(
    session_id: &str,
    operation: &str,
    mode: TimerMode,
    time_left_seconds: u32,
    is_running: bool,
) {
    tracing::info!(
        session_id = %session_id,
        operation = %operation,
        mode = %mode,
        time_left_seconds,
        is_running,
        "Timer state changed"
    );
}

/// Log a phase transition
pub fn log_phase_completed(completed_mode: TimerMode, next_mode: TimerMode, auto_started: bool) {
    tracing::info!(
        completed_mode = %completed_mode,
        next_mode = %next_mode,
        auto_started,
        "Timer phase completed"
    );
}

/// Log a drift correction that changed the countdown
pub fn log_drift_correction(session_id: &str, previous: u32, corrected: u32) {
    tracing::info!(
        session_id = %session_id,
        previous,
        corrected,
        drift = previous.abs_diff(corrected),
        "Countdown re-synced to wall clock"
    );
}

/// Log a settings update
pub fn log_settings_update(updated_fields: &[SettingsField], ignored_fields: &[SettingsField]) {
    if ignored_fields.is_empty() {
        tracing::info!(updated_fields = ?updated_fields, "Settings updated");
    } else {
        tracing::warn!(
            updated_fields = ?updated_fields,
            ignored_fields = ?ignored_fields,
            "Settings updated; locked fields ignored while timer is running"
        );
    }
}
