use super::{AnalyticsSink, SettingsStore};
use crate::error::Result;
use crate::timer::{CompletedPhase, Phase, TimerSettings};

/// Settings store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    saved: Option<TimerSettings>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TimerSettings) -> Self {
        Self {
            saved: Some(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<TimerSettings>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, settings: &TimerSettings) -> Result<()> {
        settings.validate()?;
        self.saved = Some(settings.clone());
        Ok(())
    }
}

/// Keeps every completed phase in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryAnalytics {
    pub completed: Vec<CompletedPhase>,
}

impl MemoryAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, phase: Phase) -> usize {
        self.completed.iter().filter(|c| c.phase == phase).count()
    }

    pub fn minutes(&self, phase: Phase) -> u64 {
        self.completed
            .iter()
            .filter(|c| c.phase == phase)
            .map(|c| u64::from(c.duration_min))
            .sum()
    }
}

impl AnalyticsSink for MemoryAnalytics {
    fn record(&mut self, completed: &CompletedPhase) {
        self.completed.push(*completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_loads_defaults() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.load_or_default().unwrap(), TimerSettings::default());
    }

    #[test]
    fn store_rejects_invalid_and_keeps_previous() {
        let mut store = MemorySettingsStore::with_settings(TimerSettings::default());
        let bad = TimerSettings {
            long_break_duration_min: 0,
            ..TimerSettings::default()
        };
        assert!(store.save(&bad).is_err());
        assert_eq!(store.load().unwrap(), Some(TimerSettings::default()));
    }

    #[test]
    fn analytics_sums_by_phase() {
        let mut sink = MemoryAnalytics::new();
        for _ in 0..3 {
            sink.record(&CompletedPhase {
                phase: Phase::Pomodoro,
                duration_min: 25,
                next_phase: Phase::ShortBreak,
            });
        }
        assert_eq!(sink.count(Phase::Pomodoro), 3);
        assert_eq!(sink.minutes(Phase::Pomodoro), 75);
        assert_eq!(sink.count(Phase::LongBreak), 0);
    }
}
