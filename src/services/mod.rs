//! Services for the Dorofi timer
//!
//! The synchronous timer engine, its tick schedule, the clock abstraction and
//! the service that owns them.

pub mod tick_scheduler;
pub mod time_provider;
pub mod timer_engine;
pub mod timer_service;

pub use tick_scheduler::{TickScheduler, TickToken};
pub use time_provider::{MockTimeProvider, SystemTimeProvider, TimeProvider};
pub use timer_engine::{Advance, DriftCorrection, Step, TimerEngine, TimerEngineError, TimerSnapshot, Transition};
pub use timer_service::{SettingsOutcome, TimerService, TimerServiceError, TimerServiceOptions, VisibilityOutcome};
