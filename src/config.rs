//! Configuration management for Dorofi
//!
//! Reads `DOROFI_*` environment variables over built-in defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::timer_settings::{TimerSettings, TimerSettingsError};
use crate::services::timer_engine::DEFAULT_DRIFT_TOLERANCE_SECONDS;
use crate::services::timer_service::{TimerServiceOptions, DEFAULT_EVENT_BUFFER};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Log level applied when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit JSON log lines instead of the compact console format; always on in
    /// production
    pub json_logs: bool,

    /// CORS origins (empty means allow all)
    pub cors_origins: Vec<String>,

    /// Milliseconds between countdown ticks
    pub tick_interval_ms: u64,

    /// Largest drift, in seconds, left uncorrected on re-focus
    pub drift_tolerance_seconds: u32,

    /// Capacity of the timer event channel
    pub event_buffer: usize,

    /// Timer settings in effect at startup
    pub timer: TimerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            cors_origins: vec![],
            tick_interval_ms: 1000,
            drift_tolerance_seconds: DEFAULT_DRIFT_TOLERANCE_SECONDS,
            event_buffer: DEFAULT_EVENT_BUFFER,
            timer: TimerSettings::default(),
        }
    }
}

/// Parse `key` into `target` when it is set
fn read_var<T: FromStr>(
    key: &str,
    target: &mut T,
    error: fn(String) -> ConfigError,
) -> Result<(), ConfigError> {
    if let Ok(raw) = env::var(key) {
        *target = raw.trim().parse().map_err(|_| error(raw))?;
    }
    Ok(())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server configuration
        if let Ok(host) = env::var("DOROFI_HOST") {
            config.host = host;
        }
        read_var("DOROFI_PORT", &mut config.port, ConfigError::InvalidPort)?;

        if let Ok(environment) = env::var("DOROFI_ENVIRONMENT") {
            config.environment = environment;
        }

        // Logging
        if let Ok(log_level) = env::var("DOROFI_LOG_LEVEL") {
            config.log_level = log_level;
        }
        read_var("DOROFI_JSON_LOGS", &mut config.json_logs, ConfigError::InvalidBool)?;

        // CORS origins
        if let Ok(cors_origins) = env::var("DOROFI_CORS_ORIGINS") {
            config.cors_origins = cors_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Timer engine tuning
        read_var(
            "DOROFI_TICK_INTERVAL_MS",
            &mut config.tick_interval_ms,
            ConfigError::InvalidTickInterval,
        )?;
        read_var(
            "DOROFI_DRIFT_TOLERANCE_SECONDS",
            &mut config.drift_tolerance_seconds,
            ConfigError::InvalidDriftTolerance,
        )?;
        read_var(
            "DOROFI_EVENT_BUFFER",
            &mut config.event_buffer,
            ConfigError::InvalidEventBuffer,
        )?;

        // Startup timer settings
        read_var(
            "DOROFI_WORK_MINUTES",
            &mut config.timer.work_duration_minutes,
            ConfigError::InvalidNumber,
        )?;
        read_var(
            "DOROFI_SHORT_BREAK_MINUTES",
            &mut config.timer.short_break_minutes,
            ConfigError::InvalidNumber,
        )?;
        read_var(
            "DOROFI_LONG_BREAK_MINUTES",
            &mut config.timer.long_break_minutes,
            ConfigError::InvalidNumber,
        )?;
        read_var(
            "DOROFI_SESSIONS_UNTIL_LONG_BREAK",
            &mut config.timer.sessions_until_long_break,
            ConfigError::InvalidNumber,
        )?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval(
                self.tick_interval_ms.to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(ConfigError::InvalidEventBuffer(self.event_buffer.to_string()));
        }

        self.timer.validate()?;

        Ok(())
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Options for the timer service built from this configuration
    pub fn service_options(&self) -> TimerServiceOptions {
        TimerServiceOptions {
            tick_interval: self.tick_interval(),
            drift_tolerance_seconds: self.drift_tolerance_seconds,
            event_buffer: self.event_buffer,
        }
    }

    /// Log configuration
    pub fn log_config(&self) {
        info!(
            environment = %self.environment,
            bind_address = %self.bind_address(),
            log_level = %self.log_level,
            json_logs = self.json_logs,
            cors_origins = ?self.cors_origins,
            tick_interval_ms = self.tick_interval_ms,
            drift_tolerance_seconds = self.drift_tolerance_seconds,
            event_buffer = self.event_buffer,
            "Configuration loaded"
        );
        info!(
            work_minutes = self.timer.work_duration_minutes,
            short_break_minutes = self.timer.short_break_minutes,
            long_break_minutes = self.timer.long_break_minutes,
            sessions_until_long_break = self.timer.sessions_until_long_break,
            "Default timer settings"
        );
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid boolean value: {0}")]
    InvalidBool(String),

    #[error("Invalid tick interval: {0}")]
    InvalidTickInterval(String),

    #[error("Invalid drift tolerance: {0}")]
    InvalidDriftTolerance(String),

    #[error("Invalid event buffer size: {0}")]
    InvalidEventBuffer(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid default timer settings: {0}")]
    InvalidTimerSettings(#[from] TimerSettingsError),
}
