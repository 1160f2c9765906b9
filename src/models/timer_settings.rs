//! Timer Settings Model
//!
//! Durations, long-break cadence, auto-start behaviour and the display-only
//! preferences that travel with them. Includes validation rules, default
//! values and the policy for which fields may change while a phase is running.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::timer_session::TimerMode;

/// Longest phase accepted, in minutes (one day)
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Smallest accepted long-break cadence
pub const MIN_SESSIONS_UNTIL_LONG_BREAK: u32 = 2;

/// Names of every settings field, used for lock queries and error reporting
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SettingsField {
    WorkDurationMinutes,
    ShortBreakMinutes,
    LongBreakMinutes,
    SessionsUntilLongBreak,
    AutoStartBreaks,
    AutoStartWork,
    DailyGoalMinutes,
    DailyGoalEnabled,
    Notifications,
    SoundEnabled,
}

impl SettingsField {
    /// Durations and cadence cannot change while the countdown runs
    pub fn is_locked_while_running(&self) -> bool {
        matches!(
            self,
            SettingsField::WorkDurationMinutes
                | SettingsField::ShortBreakMinutes
                | SettingsField::LongBreakMinutes
                | SettingsField::SessionsUntilLongBreak
        )
    }
}

/// Timer configuration consumed by the transition policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Work phase length in minutes (default: 25)
    pub work_duration_minutes: u32,

    /// Short break length in minutes (default: 5)
    pub short_break_minutes: u32,

    /// Long break length in minutes (default: 15)
    pub long_break_minutes: u32,

    /// Completed work phases between long breaks (default: 4)
    pub sessions_until_long_break: u32,

    /// Start breaks automatically when a work phase ends
    pub auto_start_breaks: bool,

    /// Start work automatically when a break ends
    pub auto_start_work: bool,

    /// Daily focus goal, for progress display only
    pub daily_goal_minutes: u32,

    pub daily_goal_enabled: bool,

    /// Whether system notifications are shown on phase changes
    pub notifications: bool,

    /// Whether a sound is played on phase changes
    pub sound_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            sessions_until_long_break: 4,
            auto_start_breaks: false,
            auto_start_work: false,
            daily_goal_minutes: 120,
            daily_goal_enabled: true,
            notifications: true,
            sound_enabled: true,
        }
    }
}

impl TimerSettings {
    /// Configured length of a phase in seconds
    pub fn duration_seconds(&self, mode: TimerMode) -> u32 {
        let minutes = match mode {
            TimerMode::Work => self.work_duration_minutes,
            TimerMode::ShortBreak => self.short_break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        };
        minutes.saturating_mul(60)
    }

    /// Upper bound for `time_left_seconds` under these settings
    pub fn max_duration_seconds(&self) -> u32 {
        [TimerMode::Work, TimerMode::ShortBreak, TimerMode::LongBreak]
            .into_iter()
            .map(|mode| self.duration_seconds(mode))
            .max()
            .unwrap_or(0)
    }

    /// Whether entering `mode` should start the countdown without user input
    pub fn auto_starts(&self, mode: TimerMode) -> bool {
        if mode.is_break() {
            self.auto_start_breaks
        } else {
            self.auto_start_work
        }
    }

    fn validate_duration(field: SettingsField, minutes: u32) -> Result<(), TimerSettingsError> {
        if minutes == 0 || minutes > MAX_DURATION_MINUTES {
            return Err(TimerSettingsError::InvalidDuration {
                field,
                value: minutes,
            });
        }
        Ok(())
    }

    /// Validate durations and cadence
    pub fn validate(&self) -> Result<(), TimerSettingsError> {
        Self::validate_duration(SettingsField::WorkDurationMinutes, self.work_duration_minutes)?;
        Self::validate_duration(SettingsField::ShortBreakMinutes, self.short_break_minutes)?;
        Self::validate_duration(SettingsField::LongBreakMinutes, self.long_break_minutes)?;

        if self.sessions_until_long_break < MIN_SESSIONS_UNTIL_LONG_BREAK {
            return Err(TimerSettingsError::InvalidDuration {
                field: SettingsField::SessionsUntilLongBreak,
                value: self.sessions_until_long_break,
            });
        }

        Ok(())
    }

    /// Locked fields whose values differ between `self` and `other`
    pub fn locked_changes(&self, other: &TimerSettings) -> Vec<SettingsField> {
        SettingsField::iter()
            .filter(SettingsField::is_locked_while_running)
            .filter(|field| self.locked_value(*field) != other.locked_value(*field))
            .collect()
    }

    /// `requested` with every locked field reset to the value in `self`
    pub fn with_locked_fields_of(&self, requested: &TimerSettings) -> TimerSettings {
        TimerSettings {
            work_duration_minutes: self.work_duration_minutes,
            short_break_minutes: self.short_break_minutes,
            long_break_minutes: self.long_break_minutes,
            sessions_until_long_break: self.sessions_until_long_break,
            ..requested.clone()
        }
    }

    fn locked_value(&self, field: SettingsField) -> Option<u32> {
        match field {
            SettingsField::WorkDurationMinutes => Some(self.work_duration_minutes),
            SettingsField::ShortBreakMinutes => Some(self.short_break_minutes),
            SettingsField::LongBreakMinutes => Some(self.long_break_minutes),
            SettingsField::SessionsUntilLongBreak => Some(self.sessions_until_long_break),
            _ => None,
        }
    }
}

/// Partial settings update; absent fields keep their current values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub work_duration_minutes: Option<u32>,
    pub short_break_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub sessions_until_long_break: Option<u32>,
    pub auto_start_breaks: Option<bool>,
    pub auto_start_work: Option<bool>,
    pub daily_goal_minutes: Option<u32>,
    pub daily_goal_enabled: Option<bool>,
    pub notifications: Option<bool>,
    pub sound_enabled: Option<bool>,
}

impl SettingsUpdate {
    /// Merge this update over `current`
    pub fn apply_to(&self, current: &TimerSettings) -> TimerSettings {
        TimerSettings {
            work_duration_minutes: self
                .work_duration_minutes
                .unwrap_or(current.work_duration_minutes),
            short_break_minutes: self
                .short_break_minutes
                .unwrap_or(current.short_break_minutes),
            long_break_minutes: self.long_break_minutes.unwrap_or(current.long_break_minutes),
            sessions_until_long_break: self
                .sessions_until_long_break
                .unwrap_or(current.sessions_until_long_break),
            auto_start_breaks: self.auto_start_breaks.unwrap_or(current.auto_start_breaks),
            auto_start_work: self.auto_start_work.unwrap_or(current.auto_start_work),
            daily_goal_minutes: self.daily_goal_minutes.unwrap_or(current.daily_goal_minutes),
            daily_goal_enabled: self.daily_goal_enabled.unwrap_or(current.daily_goal_enabled),
            notifications: self.notifications.unwrap_or(current.notifications),
            sound_enabled: self.sound_enabled.unwrap_or(current.sound_enabled),
        }
    }

    /// Names of the fields present in this update
    pub fn fields(&self) -> Vec<SettingsField> {
        let present = [
            (SettingsField::WorkDurationMinutes, self.work_duration_minutes.is_some()),
            (SettingsField::ShortBreakMinutes, self.short_break_minutes.is_some()),
            (SettingsField::LongBreakMinutes, self.long_break_minutes.is_some()),
            (SettingsField::SessionsUntilLongBreak, self.sessions_until_long_break.is_some()),
            (SettingsField::AutoStartBreaks, self.auto_start_breaks.is_some()),
            (SettingsField::AutoStartWork, self.auto_start_work.is_some()),
            (SettingsField::DailyGoalMinutes, self.daily_goal_minutes.is_some()),
            (SettingsField::DailyGoalEnabled, self.daily_goal_enabled.is_some()),
            (SettingsField::Notifications, self.notifications.is_some()),
            (SettingsField::SoundEnabled, self.sound_enabled.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }
}

/// Settings validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerSettingsError {
    #[error("Invalid value {value} for {field}")]
    InvalidDuration { field: SettingsField, value: u32 },
}
