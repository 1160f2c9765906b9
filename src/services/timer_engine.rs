//! Timer Engine
//!
//! Synchronous state machine for the focus/break cycle. Every change to the
//! countdown goes through [`TimerEngine::advance`], which applies one input and
//! performs at most one phase transition before returning, so no caller ever
//! observes a finished phase that has not yet switched mode.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::timer_event::TimerEvent;
use crate::models::timer_session::{TimerMode, TimerSession};
use crate::models::timer_settings::{SettingsField, TimerSettings, TimerSettingsError};
use crate::services::time_provider::TimeProvider;

/// Drift below or equal to this many seconds is left alone to avoid jitter
pub const DEFAULT_DRIFT_TOLERANCE_SECONDS: u32 = 3;

/// Input accepted by [`TimerEngine::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// One second elapsed on the tick source
    Tick,
    /// The client became visible again; reconcile against the wall clock
    Correct,
    /// End the current phase now
    Skip,
}

/// A phase change performed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: TimerMode,
    pub to: TimerMode,
    pub auto_started: bool,
}

/// Outcome of a drift check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftCorrection {
    /// Timer paused or no expected end recorded
    NotApplicable,
    WithinTolerance { drift: u32 },
    Corrected { previous: u32, corrected: u32 },
}

/// Result of one [`TimerEngine::advance`] call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step {
    pub transition: Option<Transition>,
    pub drift: Option<DriftCorrection>,
    pub events: Vec<TimerEvent>,
}

impl Step {
    fn transitioned(transition: Transition, events: Vec<TimerEvent>) -> Self {
        Self {
            transition: Some(transition),
            drift: None,
            events,
        }
    }
}

/// Serializable view of the timer for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub id: String,
    pub mode: TimerMode,
    pub time_left_seconds: u32,
    pub phase_duration_seconds: u32,
    pub is_running: bool,
    pub sessions_completed: u32,
    pub sessions_until_long_break: u32,
    pub expected_end_timestamp: Option<i64>,
    pub total_focus_seconds: u64,
    pub progress_percentage: f64,
    pub daily_goal_progress_percentage: Option<f64>,
}

/// Owner of the timer session and the settings that drive it
pub struct TimerEngine {
    session: TimerSession,
    settings: TimerSettings,
    clock: Arc<dyn TimeProvider>,
    drift_tolerance_seconds: u32,
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("session", &self.session)
            .field("settings", &self.settings)
            .field("drift_tolerance_seconds", &self.drift_tolerance_seconds)
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// Create an engine paused at the start of a work phase
    pub fn new(
        settings: TimerSettings,
        clock: Arc<dyn TimeProvider>,
    ) -> Result<Self, TimerEngineError> {
        settings.validate()?;
        let session = TimerSession::new(
            TimerMode::Work,
            settings.duration_seconds(TimerMode::Work),
        );

        Ok(Self {
            session,
            settings,
            clock,
            drift_tolerance_seconds: DEFAULT_DRIFT_TOLERANCE_SECONDS,
        })
    }

    /// Rebuild an engine around an existing session
    ///
    /// `time_left_seconds` is clamped to the longest configured phase.
    pub fn restore(
        mut session: TimerSession,
        settings: TimerSettings,
        clock: Arc<dyn TimeProvider>,
    ) -> Result<Self, TimerEngineError> {
        settings.validate()?;
        let max = settings.max_duration_seconds();
        session.time_left_seconds = session.time_left_seconds.min(max);
        session.phase_duration_seconds = session
            .phase_duration_seconds
            .clamp(session.time_left_seconds, max);

        let mut engine = Self {
            session,
            settings,
            clock,
            drift_tolerance_seconds: DEFAULT_DRIFT_TOLERANCE_SECONDS,
        };
        if engine.session.is_running {
            let now = engine.clock.now_timestamp_millis();
            engine.session.run_from(now);
        }
        Ok(engine)
    }

    pub fn with_drift_tolerance(mut self, seconds: u32) -> Self {
        self.drift_tolerance_seconds = seconds;
        self
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running
    }

    /// Start or resume the countdown. Returns whether anything changed.
    pub fn start(&mut self) -> bool {
        if self.session.is_running || self.session.time_left_seconds == 0 {
            return false;
        }
        let now = self.clock.now_timestamp_millis();
        self.session.run_from(now);
        true
    }

    /// Pause the countdown. Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        if !self.session.is_running {
            return false;
        }
        self.session.halt();
        true
    }

    /// Stop and rewind the current phase to its configured length
    pub fn reset(&mut self) {
        let mode = self.session.mode;
        self.session
            .enter_phase(mode, self.settings.duration_seconds(mode));
    }

    pub fn tick(&mut self) -> Step {
        self.advance(Advance::Tick)
    }

    pub fn correct_drift(&mut self) -> Step {
        self.advance(Advance::Correct)
    }

    pub fn skip(&mut self) -> Step {
        self.advance(Advance::Skip)
    }

    /// Apply one input; performs zero or one phase transition
    pub fn advance(&mut self, input: Advance) -> Step {
        match input {
            Advance::Tick => self.apply_tick(),
            Advance::Correct => self.apply_correction(),
            Advance::Skip => self.transition(),
        }
    }

    fn apply_tick(&mut self) -> Step {
        if self.session.time_left_seconds == 0 {
            return self.transition();
        }

        self.session.time_left_seconds -= 1;
        if self.session.mode == TimerMode::Work {
            self.session.total_focus_seconds += 1;
        }

        if self.session.time_left_seconds == 0 {
            self.transition()
        } else {
            Step::default()
        }
    }

    fn apply_correction(&mut self) -> Step {
        let expected_end = match (self.session.is_running, self.session.expected_end_timestamp) {
            (true, Some(end)) => end,
            _ => {
                return Step {
                    drift: Some(DriftCorrection::NotApplicable),
                    ..Step::default()
                }
            }
        };

        let remaining_ms = expected_end - self.clock.now_timestamp_millis();
        let corrected = if remaining_ms <= 0 {
            0
        } else {
            u32::try_from((remaining_ms + 999) / 1000)
                .unwrap_or(u32::MAX)
                .min(self.session.phase_duration_seconds)
        };

        let previous = self.session.time_left_seconds;
        let drift = previous.abs_diff(corrected);
        if drift <= self.drift_tolerance_seconds {
            return Step {
                drift: Some(DriftCorrection::WithinTolerance { drift }),
                ..Step::default()
            };
        }

        debug!(previous, corrected, drift, "Applying drift correction");
        if self.session.mode == TimerMode::Work && corrected < previous {
            self.session.total_focus_seconds += u64::from(previous - corrected);
        }
        self.session.time_left_seconds = corrected;

        let mut step = if corrected == 0 {
            self.transition()
        } else {
            Step::default()
        };
        step.drift = Some(DriftCorrection::Corrected {
            previous,
            corrected,
        });
        step
    }

    /// Leave the current phase and enter the next one
    fn transition(&mut self) -> Step {
        let now = self.clock.now_utc();
        let completed_mode = self.session.mode;
        let mut events = Vec::with_capacity(2);

        let next_mode = match completed_mode {
            TimerMode::Work => {
                self.session.sessions_completed = self.session.sessions_completed.saturating_add(1);
                events.push(TimerEvent::SessionCompleted {
                    session_id: self.session.id.clone(),
                    mode: TimerMode::Work,
                    duration_seconds: self.session.elapsed_in_phase(),
                    completed_at: now,
                });

                if self.session.sessions_completed % self.settings.sessions_until_long_break == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
        };

        self.session
            .enter_phase(next_mode, self.settings.duration_seconds(next_mode));
        let auto_started = self.settings.auto_starts(next_mode);
        if auto_started {
            self.session.run_from(now.timestamp_millis());
        }

        events.push(TimerEvent::PhaseCompleted {
            completed_mode,
            next_mode,
            auto_started,
            at: now,
        });

        Step::transitioned(
            Transition {
                from: completed_mode,
                to: next_mode,
                auto_started,
            },
            events,
        )
    }

    /// Replace the settings wholesale
    ///
    /// Rejected with [`TimerEngineError::SettingsLockedWhileRunning`] when the
    /// timer runs and a duration or the cadence would change.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> Result<(), TimerEngineError> {
        settings.validate()?;

        if self.session.is_running {
            let fields = self.settings.locked_changes(&settings);
            if !fields.is_empty() {
                return Err(TimerEngineError::SettingsLockedWhileRunning { fields });
            }
        }

        self.replace_settings(settings);
        Ok(())
    }

    /// Apply what may be applied now and return the locked fields that were
    /// left at their current values
    pub fn apply_unlocked_settings(
        &mut self,
        settings: TimerSettings,
    ) -> Result<Vec<SettingsField>, TimerEngineError> {
        settings.validate()?;

        let ignored = if self.session.is_running {
            self.settings.locked_changes(&settings)
        } else {
            Vec::new()
        };
        let effective = if ignored.is_empty() {
            settings
        } else {
            self.settings.with_locked_fields_of(&settings)
        };

        self.replace_settings(effective);
        Ok(ignored)
    }

    fn replace_settings(&mut self, settings: TimerSettings) {
        let mode = self.session.mode;
        let previous_duration = self.settings.duration_seconds(mode);
        self.settings = settings;

        let duration = self.settings.duration_seconds(mode);
        if !self.session.is_running && duration != previous_duration {
            self.session.enter_phase(mode, duration);
        }
    }

    /// Whether the UI should render `field` as non-interactive right now
    pub fn is_timer_setting_disabled(&self, field: SettingsField) -> bool {
        self.session.is_running && field.is_locked_while_running()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let goal_seconds = u64::from(self.settings.daily_goal_minutes) * 60;
        let daily_goal_progress_percentage = (self.settings.daily_goal_enabled
            && goal_seconds > 0)
            .then(|| (self.session.total_focus_seconds as f64 / goal_seconds as f64 * 100.0).min(100.0));

        TimerSnapshot {
            id: self.session.id.clone(),
            mode: self.session.mode,
            time_left_seconds: self.session.time_left_seconds,
            phase_duration_seconds: self.session.phase_duration_seconds,
            is_running: self.session.is_running,
            sessions_completed: self.session.sessions_completed,
            sessions_until_long_break: self.settings.sessions_until_long_break,
            expected_end_timestamp: self.session.expected_end_timestamp,
            total_focus_seconds: self.session.total_focus_seconds,
            progress_percentage: self.session.progress() * 100.0,
            daily_goal_progress_percentage,
        }
    }
}

/// Timer engine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerEngineError {
    #[error("Settings {fields:?} cannot change while the timer is running")]
    SettingsLockedWhileRunning { fields: Vec<SettingsField> },

    #[error(transparent)]
    InvalidSettings(#[from] TimerSettingsError),
}
