//! Timer Service
//!
//! Single owner of the timer engine. Serializes every mutation behind one
//! lock, keeps the tick schedule armed exactly while the countdown runs, and
//! publishes phase and session events to subscribers.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::logging;
use crate::models::timer_event::TimerEvent;
use crate::models::timer_settings::{SettingsField, SettingsUpdate, TimerSettings};
use crate::services::tick_scheduler::{TickScheduler, TickToken, DEFAULT_TICK_INTERVAL};
use crate::services::time_provider::{SystemTimeProvider, TimeProvider};
use crate::services::timer_engine::{
    DriftCorrection, Step, TimerEngine, TimerEngineError, TimerSnapshot,
    DEFAULT_DRIFT_TOLERANCE_SECONDS,
};

/// Default capacity of the event channel
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Tuning knobs for a [`TimerService`]
#[derive(Debug, Clone)]
pub struct TimerServiceOptions {
    pub tick_interval: Duration,
    pub drift_tolerance_seconds: u32,
    pub event_buffer: usize,
}

impl Default for TimerServiceOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            drift_tolerance_seconds: DEFAULT_DRIFT_TOLERANCE_SECONDS,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

/// Result of a settings update from the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsOutcome {
    pub settings: TimerSettings,
    /// Locked fields left unchanged because the timer is running
    pub ignored_fields: Vec<SettingsField>,
}

/// Result of a visibility change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityOutcome {
    pub correction: DriftCorrection,
    pub timer: TimerSnapshot,
}

/// Timer service shared by the API handlers and the tick task
#[derive(Debug, Clone)]
pub struct TimerService {
    engine: Arc<Mutex<TimerEngine>>,
    ticker: Arc<Mutex<TickScheduler>>,
    events: broadcast::Sender<TimerEvent>,
}

impl TimerService {
    /// Create a service on the system clock with default options
    pub fn new(settings: TimerSettings) -> Result<Self, TimerServiceError> {
        Self::with_clock(
            settings,
            Arc::new(SystemTimeProvider::new()),
            TimerServiceOptions::default(),
        )
    }

    pub fn with_clock(
        settings: TimerSettings,
        clock: Arc<dyn TimeProvider>,
        options: TimerServiceOptions,
    ) -> Result<Self, TimerServiceError> {
        let engine = TimerEngine::new(settings, clock)?
            .with_drift_tolerance(options.drift_tolerance_seconds);
        Ok(Self::from_engine(engine, &options))
    }

    /// Wrap an already-built engine
    ///
    /// A running engine gets its tick schedule armed straight away, so this
    /// must then be called from within a tokio runtime.
    pub fn from_engine(engine: TimerEngine, options: &TimerServiceOptions) -> Self {
        let (events, _) = broadcast::channel(options.event_buffer.max(1));
        let service = Self {
            engine: Arc::new(Mutex::new(engine)),
            ticker: Arc::new(Mutex::new(TickScheduler::new(options.tick_interval))),
            events,
        };
        {
            let engine = service.engine.lock().unwrap_or_else(PoisonError::into_inner);
            service.sync_ticker(&engine, false);
        }
        service
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    fn engine(&self) -> Result<MutexGuard<'_, TimerEngine>, TimerServiceError> {
        self.engine
            .lock()
            .map_err(|_| TimerServiceError::StatePoisoned)
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, TimerServiceError> {
        Ok(self.engine()?.snapshot())
    }

    pub fn settings(&self) -> Result<TimerSettings, TimerServiceError> {
        Ok(self.engine()?.settings().clone())
    }

    pub fn is_running(&self) -> Result<bool, TimerServiceError> {
        Ok(self.engine()?.is_running())
    }

    /// Whether a tick schedule is alive
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_armed()
    }

    pub fn start(&self) -> Result<TimerSnapshot, TimerServiceError> {
        let (changed, snapshot) = {
            let mut engine = self.engine()?;
            let changed = engine.start();
            self.sync_ticker(&engine, false);
            (changed, engine.snapshot())
        };
        if changed {
            log_change("start", &snapshot);
        }
        Ok(snapshot)
    }

    pub fn pause(&self) -> Result<TimerSnapshot, TimerServiceError> {
        let (changed, snapshot) = {
            let mut engine = self.engine()?;
            let changed = engine.pause();
            self.sync_ticker(&engine, false);
            (changed, engine.snapshot())
        };
        if changed {
            log_change("pause", &snapshot);
        }
        Ok(snapshot)
    }

    pub fn reset(&self) -> Result<TimerSnapshot, TimerServiceError> {
        let snapshot = {
            let mut engine = self.engine()?;
            engine.reset();
            self.sync_ticker(&engine, false);
            engine.snapshot()
        };
        log_change("reset", &snapshot);
        Ok(snapshot)
    }

    /// End the current phase early
    pub fn skip(&self) -> Result<TimerSnapshot, TimerServiceError> {
        let (step, snapshot) = {
            let mut engine = self.engine()?;
            let step = engine.skip();
            self.sync_ticker(&engine, step.transition.is_some());
            (step, engine.snapshot())
        };
        log_change("skip", &snapshot);
        self.publish(step);
        Ok(snapshot)
    }

    /// Handle the client becoming visible or hidden
    ///
    /// Hidden clients need nothing; on becoming visible the countdown is
    /// reconciled against the wall clock.
    pub fn visibility_changed(&self, visible: bool) -> Result<VisibilityOutcome, TimerServiceError> {
        if !visible {
            return Ok(VisibilityOutcome {
                correction: DriftCorrection::NotApplicable,
                timer: self.snapshot()?,
            });
        }

        let (step, snapshot) = {
            let mut engine = self.engine()?;
            let step = engine.correct_drift();
            self.sync_ticker(&engine, step.transition.is_some());
            (step, engine.snapshot())
        };

        let correction = step.drift.unwrap_or(DriftCorrection::NotApplicable);
        if let DriftCorrection::Corrected {
            previous,
            corrected,
        } = correction
        {
            logging::log_drift_correction(&snapshot.id, previous, corrected);
        }

        self.publish(step);
        Ok(VisibilityOutcome {
            correction,
            timer: snapshot,
        })
    }

    /// Replace the settings, failing if a locked field would change mid-phase
    pub fn apply_settings(&self, settings: TimerSettings) -> Result<TimerSettings, TimerServiceError> {
        let mut engine = self.engine()?;
        engine.apply_settings(settings)?;
        Ok(engine.settings().clone())
    }

    /// Merge a partial update, applying whatever is currently allowed
    pub fn update_settings(&self, update: &SettingsUpdate) -> Result<SettingsOutcome, TimerServiceError> {
        let outcome = {
            let mut engine = self.engine()?;
            let requested = update.apply_to(engine.settings());
            let ignored_fields = engine.apply_unlocked_settings(requested)?;
            SettingsOutcome {
                settings: engine.settings().clone(),
                ignored_fields,
            }
        };

        logging::log_settings_update(&update.fields(), &outcome.ignored_fields);
        Ok(outcome)
    }

    pub fn is_setting_disabled(&self, field: SettingsField) -> Result<bool, TimerServiceError> {
        Ok(self.engine()?.is_timer_setting_disabled(field))
    }

    /// Arm or disarm the schedule to match the engine
    ///
    /// Called with the engine lock held so concurrent operations cannot leave
    /// the schedule out of step with `is_running`. `new_phase` restarts a
    /// live schedule so the first tick of an auto-started phase lands one full
    /// period after it began.
    fn sync_ticker(&self, engine: &TimerEngine, new_phase: bool) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if new_phase {
            ticker.disarm();
        }
        if engine.is_running() {
            let engine = Arc::downgrade(&self.engine);
            let events = self.events.clone();
            ticker.arm(move |token| match engine.upgrade() {
                Some(engine) => run_tick(&engine, &events, token),
                None => ControlFlow::Break(()),
            });
        } else {
            ticker.disarm();
        }
    }

    fn publish(&self, step: Step) {
        publish(&self.events, step);
    }
}

/// Apply one tick from the schedule
///
/// Never fails: a poisoned lock is logged and recovered so that later ticks
/// keep firing. Whether to stop is decided under the engine lock so a
/// concurrent `start` either sees the finished token or is seen by this tick.
fn run_tick(
    engine: &Mutex<TimerEngine>,
    events: &broadcast::Sender<TimerEvent>,
    token: &TickToken,
) -> ControlFlow<()> {
    let step = {
        let mut engine = match engine.lock() {
            Ok(engine) => engine,
            Err(poisoned) => {
                error!("Timer state lock poisoned during tick; recovering");
                poisoned.into_inner()
            }
        };
        if token.is_finished() || !engine.is_running() {
            token.finish();
            return ControlFlow::Break(());
        }
        let step = engine.tick();
        if !engine.is_running() {
            token.finish();
        }
        step
    };

    if let Some(transition) = step.transition {
        debug!(from = %transition.from, to = %transition.to, "Phase ended on tick");
    }
    publish(events, step);

    if token.is_finished() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

fn publish(events: &broadcast::Sender<TimerEvent>, step: Step) {
    for event in step.events {
        if let TimerEvent::PhaseCompleted {
            completed_mode,
            next_mode,
            auto_started,
            ..
        } = &event
        {
            logging::log_phase_completed(*completed_mode, *next_mode, *auto_started);
        }
        if events.send(event).is_err() {
            debug!("Timer event dropped: no subscribers");
        }
    }
}

fn log_change(operation: &str, snapshot: &TimerSnapshot) {
    logging::log_timer_state_change(
        &snapshot.id,
        operation,
        snapshot.mode,
        snapshot.time_left_seconds,
        snapshot.is_running,
    );
}

/// Timer service errors
#[derive(Debug, thiserror::Error)]
pub enum TimerServiceError {
    #[error(transparent)]
    Engine(#[from] TimerEngineError),

    #[error("Timer state is unavailable after a panic")]
    StatePoisoned,
}
