use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CompletedPhase, Phase, TimerSettings};

/// Every observable change of the phase-cycle engine.
/// The CLI prints these as JSON lines; nothing in the engine consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseStarted {
        phase: Phase,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: Phase,
        duration_min: u32,
        next_phase: Phase,
        completed_pomodoros_total: u64,
        at: DateTime<Utc>,
    },
    RecallSubmitted {
        summary_chars: usize,
        at: DateTime<Utc>,
    },
    TimerToggled {
        running: bool,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SettingsApplied {
        settings: TimerSettings,
        at: DateTime<Utc>,
    },
    SessionReset {
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    CycleReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        title: String,
        running: bool,
        remaining_secs: u32,
        total_secs: u32,
        clock: String,
        progress: f64,
        pomodoro_count_in_cycle: u32,
        completed_pomodoros_total: u64,
        step_index: usize,
        cycle_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn phase_started(phase: Phase, duration_secs: u32) -> Self {
        Event::PhaseStarted {
            phase,
            duration_secs,
            at: Utc::now(),
        }
    }

    pub fn phase_completed(done: &CompletedPhase, completed_pomodoros_total: u64) -> Self {
        Event::PhaseCompleted {
            phase: done.phase,
            duration_min: done.duration_min,
            next_phase: done.next_phase,
            completed_pomodoros_total,
            at: Utc::now(),
        }
    }

    pub fn recall_submitted(summary: &str) -> Self {
        Event::RecallSubmitted {
            summary_chars: summary.trim().chars().count(),
            at: Utc::now(),
        }
    }

    pub fn timer_toggled(running: bool, remaining_secs: u32) -> Self {
        Event::TimerToggled {
            running,
            remaining_secs,
            at: Utc::now(),
        }
    }

    pub fn settings_applied(settings: TimerSettings) -> Self {
        Event::SettingsApplied {
            settings,
            at: Utc::now(),
        }
    }

    pub fn session_reset(phase: Phase, remaining_secs: u32) -> Self {
        Event::SessionReset {
            phase,
            remaining_secs,
            at: Utc::now(),
        }
    }

    pub fn cycle_reset() -> Self {
        Event::CycleReset { at: Utc::now() }
    }
}
