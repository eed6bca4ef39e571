//! Display-only layout of one full cycle.
//!
//! Steps are a pure function of [`TimerSettings`]; they never feed back
//! into the engine's state.

use serde::{Deserialize, Serialize};

use super::phase::Phase;
use super::settings::TimerSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub key: String,
    pub label: String,
    pub phase: Phase,
    /// Zero-based pomodoro slot for pomodoro and short-break steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Build the step sequence: N pomodoros with a short break between each
/// pair, then the long break, then active recall when enabled.
pub fn build_progress_steps(settings: &TimerSettings) -> Vec<ProgressStep> {
    let n = settings.pomodoros_until_long_break;
    let mut steps = Vec::with_capacity(step_count(settings));

    for i in 0..n {
        steps.push(ProgressStep {
            key: format!("pomodoro-{}", i + 1),
            label: format!("Pomodoro {}", i + 1),
            phase: Phase::Pomodoro,
            index: Some(i),
        });
        if i + 1 < n {
            steps.push(ProgressStep {
                key: format!("short-break-{}", i + 1),
                label: Phase::ShortBreak.label().into(),
                phase: Phase::ShortBreak,
                index: Some(i),
            });
        }
    }

    steps.push(ProgressStep {
        key: "long-break".into(),
        label: Phase::LongBreak.label().into(),
        phase: Phase::LongBreak,
        index: None,
    });
    if settings.active_recall_enabled {
        steps.push(ProgressStep {
            key: "active-recall".into(),
            label: Phase::ActiveRecall.label().into(),
            phase: Phase::ActiveRecall,
            index: None,
        });
    }
    steps
}

/// Number of steps [`build_progress_steps`] yields for `settings`.
pub fn step_count(settings: &TimerSettings) -> usize {
    let n = settings.pomodoros_until_long_break as usize;
    n.saturating_mul(2).saturating_sub(1) + 1 + usize::from(settings.active_recall_enabled)
}

/// Index of the highlighted step for `phase` with `count` pomodoros done
/// in the current cycle.
pub fn current_step_index(phase: Phase, count: u32, settings: &TimerSettings) -> usize {
    let long_break = (settings.pomodoros_until_long_break as usize)
        .saturating_mul(2)
        .saturating_sub(1);
    match phase {
        Phase::Pomodoro => (count as usize).saturating_mul(2),
        Phase::ShortBreak => (count as usize).saturating_mul(2).saturating_sub(1),
        Phase::LongBreak => long_break,
        Phase::ActiveRecall => long_break + 1,
    }
}

/// Percentage of the cycle's pomodoros already behind the user.
pub fn cycle_progress_pct(phase: Phase, count: u32, settings: &TimerSettings) -> f64 {
    let n = settings.pomodoros_until_long_break;
    if n == 0 {
        return 0.0;
    }
    match phase {
        Phase::Pomodoro | Phase::ShortBreak => (f64::from(count) / f64::from(n) * 100.0).min(100.0),
        Phase::LongBreak | Phase::ActiveRecall => 100.0,
    }
}
