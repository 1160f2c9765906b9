//! Dorofi timer core
//!
//! Focus/break countdown state machine with tick scheduling, drift correction
//! after the client is backgrounded, and a JSON HTTP API for the UI.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{SettingsField, SettingsUpdate, TimerEvent, TimerMode, TimerSession, TimerSettings};
pub use services::{TimerEngine, TimerService};
