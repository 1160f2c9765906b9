//! Timer Session Model
//!
//! Represents the live countdown state for a focus/break cycle: the current
//! mode, remaining seconds, completed work sessions and accumulated focus time.

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Timer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Get display name for this mode
    pub fn display_name(&self) -> &'static str {
        match self {
            TimerMode::Work => "Work Session",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Work)
    }
}

/// Timer session representing the current pomodoro state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSession {
    /// Unique identifier for the session
    pub id: String,

    /// Current phase
    pub mode: TimerMode,

    /// Seconds remaining in the current phase
    pub time_left_seconds: u32,

    /// Length of the current phase when it began, in seconds
    pub phase_duration_seconds: u32,

    /// Whether the countdown is currently running
    pub is_running: bool,

    /// Work phases completed since the session was created
    pub sessions_completed: u32,

    /// Wall-clock instant (epoch millis) at which the running phase ends
    pub expected_end_timestamp: Option<i64>,

    /// Seconds spent counting down in work mode
    pub total_focus_seconds: u64,
}

impl TimerSession {
    /// Create a paused session at the start of the given phase
    pub fn new(mode: TimerMode, duration_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            mode,
            time_left_seconds: duration_seconds,
            phase_duration_seconds: duration_seconds,
            is_running: false,
            sessions_completed: 0,
            expected_end_timestamp: None,
            total_focus_seconds: 0,
        }
    }

    /// Seconds already counted down in the current phase
    pub fn elapsed_in_phase(&self) -> u32 {
        self.phase_duration_seconds
            .saturating_sub(self.time_left_seconds)
    }

    /// Get progress through the current phase (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.phase_duration_seconds == 0 {
            0.0
        } else {
            f64::from(self.elapsed_in_phase()) / f64::from(self.phase_duration_seconds)
        }
    }

    /// Begin a fresh phase, paused, with the given length
    pub(crate) fn enter_phase(&mut self, mode: TimerMode, duration_seconds: u32) {
        self.mode = mode;
        self.time_left_seconds = duration_seconds;
        self.phase_duration_seconds = duration_seconds;
        self.is_running = false;
        self.expected_end_timestamp = None;
    }

    /// Mark the session running, anchoring the expected end at `now_millis`
    pub(crate) fn run_from(&mut self, now_millis: i64) {
        self.is_running = true;
        self.expected_end_timestamp =
            Some(now_millis + i64::from(self.time_left_seconds) * 1000);
    }

    pub(crate) fn halt(&mut self) {
        self.is_running = false;
        self.expected_end_timestamp = None;
    }
}
