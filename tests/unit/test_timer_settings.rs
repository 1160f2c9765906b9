use dorofi::models::timer_settings::{TimerSettingsError, MAX_DURATION_MINUTES};
use dorofi::{SettingsField, SettingsUpdate, TimerMode, TimerSettings};

#[test]
fn test_duration_bounds() {
    let at_limit = TimerSettings {
        long_break_minutes: MAX_DURATION_MINUTES,
        ..TimerSettings::default()
    };
    assert!(at_limit.validate().is_ok());
    assert_eq!(at_limit.max_duration_seconds(), 86_400);

    let too_long = TimerSettings {
        long_break_minutes: MAX_DURATION_MINUTES + 1,
        ..TimerSettings::default()
    };
    assert_eq!(
        too_long.validate(),
        Err(TimerSettingsError::InvalidDuration {
            field: SettingsField::LongBreakMinutes,
            value: 1441,
        })
    );

    let zero = TimerSettings {
        short_break_minutes: 0,
        ..TimerSettings::default()
    };
    assert!(matches!(
        zero.validate(),
        Err(TimerSettingsError::InvalidDuration {
            field: SettingsField::ShortBreakMinutes,
            ..
        })
    ));
}

#[test]
fn test_cadence_must_allow_a_short_break() {
    let settings = TimerSettings {
        sessions_until_long_break: 1,
        ..TimerSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_partial_update_keeps_absent_fields() {
    let update: SettingsUpdate =
        serde_json::from_str(r#"{"short_break_minutes": 10, "sound_enabled": false}"#).unwrap();
    let merged = update.apply_to(&TimerSettings::default());

    assert_eq!(merged.short_break_minutes, 10);
    assert!(!merged.sound_enabled);
    assert_eq!(merged.work_duration_minutes, 25);
    assert_eq!(merged.duration_seconds(TimerMode::ShortBreak), 600);
    assert_eq!(
        update.fields(),
        vec![SettingsField::ShortBreakMinutes, SettingsField::SoundEnabled]
    );
}

#[test]
fn test_locked_changes_ignore_preferences() {
    let current = TimerSettings::default();
    let requested = TimerSettings {
        sessions_until_long_break: 6,
        daily_goal_minutes: 240,
        ..TimerSettings::default()
    };

    assert_eq!(
        current.locked_changes(&requested),
        vec![SettingsField::SessionsUntilLongBreak]
    );

    let allowed = current.with_locked_fields_of(&requested);
    assert_eq!(allowed.sessions_until_long_break, 4);
    assert_eq!(allowed.daily_goal_minutes, 240);
}

#[test]
fn test_settings_field_wire_names() {
    assert_eq!(
        serde_json::to_string(&SettingsField::WorkDurationMinutes).unwrap(),
        r#""work_duration_minutes""#
    );
    assert_eq!(SettingsField::AutoStartBreaks.to_string(), "auto_start_breaks");
}
