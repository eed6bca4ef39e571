use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::error::{SettingsField, ValidationError};

/// Timer settings. Replaced wholesale on save, never edited in place
/// while an engine holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_pomodoro_duration")]
    pub pomodoro_duration_min: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration_min: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration_min: u32,
    #[serde(default = "default_pomodoros_until_long_break")]
    pub pomodoros_until_long_break: u32,
    /// Insert an active-recall phase after each long break.
    #[serde(default)]
    pub active_recall_enabled: bool,
    /// Untimed recall waits for a manual submission.
    #[serde(default = "default_true")]
    pub active_recall_timed: bool,
    #[serde(default = "default_active_recall_duration")]
    pub active_recall_duration_min: u32,
}

fn default_pomodoro_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_pomodoros_until_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_active_recall_duration() -> u32 {
    10
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            pomodoro_duration_min: default_pomodoro_duration(),
            short_break_duration_min: default_short_break(),
            long_break_duration_min: default_long_break(),
            pomodoros_until_long_break: default_pomodoros_until_long_break(),
            active_recall_enabled: false,
            active_recall_timed: true,
            active_recall_duration_min: default_active_recall_duration(),
        }
    }
}

impl TimerSettings {
    /// Check every field and report all offenders at once.
    ///
    /// The recall duration only matters when recall is both enabled and timed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();
        if self.pomodoro_duration_min == 0 {
            fields.push(SettingsField::PomodoroDuration);
        }
        if self.short_break_duration_min == 0 {
            fields.push(SettingsField::ShortBreakDuration);
        }
        if self.long_break_duration_min == 0 {
            fields.push(SettingsField::LongBreakDuration);
        }
        if self.pomodoros_until_long_break < 1 {
            fields.push(SettingsField::PomodorosUntilLongBreak);
        }
        if self.recall_has_countdown() && self.active_recall_duration_min == 0 {
            fields.push(SettingsField::ActiveRecallDuration);
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidSettings { fields })
        }
    }

    pub fn recall_has_countdown(&self) -> bool {
        self.active_recall_enabled && self.active_recall_timed
    }

    /// Configured length of `phase` in minutes. Untimed recall has none.
    pub fn phase_duration_min(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Pomodoro => self.pomodoro_duration_min,
            Phase::ShortBreak => self.short_break_duration_min,
            Phase::LongBreak => self.long_break_duration_min,
            Phase::ActiveRecall if self.active_recall_timed => self.active_recall_duration_min,
            Phase::ActiveRecall => 0,
        }
    }

    /// Countdown length of `phase` in seconds.
    ///
    /// Uses saturating arithmetic so absurd minute values cannot overflow.
    pub fn phase_duration_secs(&self, phase: Phase) -> u32 {
        self.phase_duration_min(phase).saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let s = TimerSettings::default();
        assert_eq!(s.pomodoro_duration_min, 25);
        assert_eq!(s.short_break_duration_min, 5);
        assert_eq!(s.long_break_duration_min, 15);
        assert_eq!(s.pomodoros_until_long_break, 4);
        assert!(!s.active_recall_enabled);
        assert!(s.active_recall_timed);
        assert_eq!(s.active_recall_duration_min, 10);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validate_collects_all_offending_fields() {
        let s = TimerSettings {
            pomodoro_duration_min: 0,
            long_break_duration_min: 0,
            pomodoros_until_long_break: 0,
            ..TimerSettings::default()
        };
        let err = s.validate().unwrap_err();
        assert_eq!(
            err.fields(),
            &[
                SettingsField::PomodoroDuration,
                SettingsField::LongBreakDuration,
                SettingsField::PomodorosUntilLongBreak,
            ]
        );
    }

    #[test]
    fn recall_duration_checked_only_when_enabled_and_timed() {
        let mut s = TimerSettings {
            active_recall_duration_min: 0,
            ..TimerSettings::default()
        };
        assert!(s.validate().is_ok());

        s.active_recall_enabled = true;
        assert_eq!(
            s.validate().unwrap_err().fields(),
            &[SettingsField::ActiveRecallDuration]
        );

        s.active_recall_timed = false;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn untimed_recall_has_zero_duration() {
        let s = TimerSettings {
            active_recall_enabled: true,
            active_recall_timed: false,
            ..TimerSettings::default()
        };
        assert_eq!(s.phase_duration_secs(Phase::ActiveRecall), 0);
        assert_eq!(s.phase_duration_secs(Phase::Pomodoro), 1500);
        assert_eq!(s.phase_duration_secs(Phase::ShortBreak), 300);
        assert_eq!(s.phase_duration_secs(Phase::LongBreak), 900);
    }

    #[test]
    fn duration_saturates() {
        let s = TimerSettings {
            pomodoro_duration_min: u32::MAX,
            ..TimerSettings::default()
        };
        assert_eq!(s.phase_duration_secs(Phase::Pomodoro), u32::MAX);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: TimerSettings = toml::from_str("pomodoro_duration_min = 50").unwrap();
        assert_eq!(s.pomodoro_duration_min, 50);
        assert_eq!(s.short_break_duration_min, 5);
        assert!(s.active_recall_timed);
    }
}
