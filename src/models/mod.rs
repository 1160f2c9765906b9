//! Data models for the Dorofi timer
//!
//! Session state, settings and the events published on phase changes.

pub mod timer_event;
pub mod timer_session;
pub mod timer_settings;

pub use timer_event::{NotificationType, TimerEvent};
pub use timer_session::{TimerMode, TimerSession};
pub use timer_settings::{SettingsField, SettingsUpdate, TimerSettings, TimerSettingsError};
