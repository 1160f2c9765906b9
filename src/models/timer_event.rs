//! Timer Event Model
//!
//! Events published when a phase ends, for notification and persistence
//! listeners outside the timer core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timer_session::TimerMode;

/// Notification cue for a phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    WorkPhaseComplete,
    BreakPhaseComplete,
}

impl NotificationType {
    /// Entering work uses the work cue, entering any break uses the break cue.
    pub fn for_next_mode(next_mode: TimerMode) -> Self {
        if next_mode.is_break() {
            NotificationType::BreakPhaseComplete
        } else {
            NotificationType::WorkPhaseComplete
        }
    }

    /// Get display name for this notification type
    pub fn display_name(&self) -> &'static str {
        match self {
            NotificationType::WorkPhaseComplete => "Work Phase Complete",
            NotificationType::BreakPhaseComplete => "Break Phase Complete",
        }
    }

    /// Get default message for this notification type
    pub fn default_message(&self) -> &'static str {
        match self {
            NotificationType::WorkPhaseComplete => "Break is over. Ready to focus?",
            NotificationType::BreakPhaseComplete => "Nice work! Time for a break.",
        }
    }
}

/// Event published by the timer core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    /// A phase ended and the next one has been entered
    PhaseCompleted {
        completed_mode: TimerMode,
        next_mode: TimerMode,
        auto_started: bool,
        at: DateTime<Utc>,
    },

    /// A work phase ended; the persistence listener stores it
    SessionCompleted {
        session_id: String,
        mode: TimerMode,
        duration_seconds: u32,
        completed_at: DateTime<Utc>,
    },
}

impl TimerEvent {
    /// Notification cue carried by this event, if any
    pub fn notification_type(&self) -> Option<NotificationType> {
        match self {
            TimerEvent::PhaseCompleted { next_mode, .. } => {
                Some(NotificationType::for_next_mode(*next_mode))
            }
            TimerEvent::SessionCompleted { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TimerEvent::PhaseCompleted { .. } => "PhaseCompleted",
            TimerEvent::SessionCompleted { .. } => "SessionCompleted",
        }
    }
}
