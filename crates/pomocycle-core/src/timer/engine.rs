//! Phase-cycle engine.
//!
//! The engine is a pure state machine with no internal clock or threads.
//! A driver calls `tick()` once per elapsed second; every other operation
//! is an explicit command from the caller.
//!
//! ## Transitions
//!
//! ```text
//! Pomodoro -> ShortBreak -> Pomodoro -> ... -> LongBreak -> [ActiveRecall] -> Pomodoro
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PhaseCycleEngine::new(settings)?;
//! engine.toggle_running();
//! // Once per second:
//! let outcome = engine.tick();
//! if let Some(done) = outcome.completed { sink.record(&done); }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use super::settings::TimerSettings;
use super::steps::{self, ProgressStep};
use crate::error::ValidationError;
use crate::events::Event;

const DEFAULT_RECALL_TOPIC: &str = "your recent work";

/// Mutable per-session state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    pub phase: Phase,
    pub remaining_secs: u32,
    /// Pomodoros completed since the last long break.
    pub pomodoro_count_in_cycle: u32,
    pub completed_pomodoros_total: u64,
    pub is_running: bool,
    /// Text typed so far during active recall.
    pub recall_draft: String,
    pub recall_topic: String,
}

impl CycleState {
    fn fresh(settings: &TimerSettings) -> Self {
        Self {
            phase: Phase::Pomodoro,
            remaining_secs: settings.phase_duration_secs(Phase::Pomodoro),
            pomodoro_count_in_cycle: 0,
            completed_pomodoros_total: 0,
            is_running: false,
            recall_draft: String::new(),
            recall_topic: DEFAULT_RECALL_TOPIC.into(),
        }
    }
}

/// A phase that just ran to completion, for the analytics sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPhase {
    pub phase: Phase,
    pub duration_min: u32,
    pub next_phase: Phase,
}

/// Result of `tick()` or a recall submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub phase: Phase,
    pub remaining_secs: u32,
    pub completed: Option<CompletedPhase>,
}

/// Owns the committed settings and the cycle state.
#[derive(Debug, Clone)]
pub struct PhaseCycleEngine {
    settings: TimerSettings,
    state: CycleState,
}

impl PhaseCycleEngine {
    /// Create an engine at Pomodoro 1 with the timer stopped.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidSettings` if `settings` are out of range.
    pub fn new(settings: TimerSettings) -> Result<Self, ValidationError> {
        settings.validate()?;
        let state = CycleState::fresh(&settings);
        Ok(Self { settings, state })
    }

    pub fn with_defaults() -> Self {
        let settings = TimerSettings::default();
        let state = CycleState::fresh(&settings);
        Self { settings, state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Full countdown length of the current phase.
    pub fn phase_duration_secs(&self) -> u32 {
        self.settings.phase_duration_secs(self.state.phase)
    }

    /// False only for untimed active recall, which waits for a submission.
    pub fn is_timed(&self) -> bool {
        self.phase_duration_secs() > 0
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.phase_duration_secs();
        if total == 0 {
            return 0.0;
        }
        let elapsed = f64::from(total) - f64::from(self.state.remaining_secs);
        (elapsed / f64::from(total)).clamp(0.0, 1.0)
    }

    pub fn progress_steps(&self) -> Vec<ProgressStep> {
        steps::build_progress_steps(&self.settings)
    }

    pub fn current_step_index(&self) -> usize {
        steps::current_step_index(
            self.state.phase,
            self.state.pomodoro_count_in_cycle,
            &self.settings,
        )
    }

    pub fn cycle_progress_pct(&self) -> f64 {
        steps::cycle_progress_pct(
            self.state.phase,
            self.state.pomodoro_count_in_cycle,
            &self.settings,
        )
    }

    pub fn phase_title(&self) -> String {
        match self.state.phase {
            Phase::Pomodoro => format!(
                "Pomodoro {} of {}",
                self.state.pomodoro_count_in_cycle + 1,
                self.settings.pomodoros_until_long_break
            ),
            other => other.label().to_string(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.state.phase,
            title: self.phase_title(),
            running: self.state.is_running,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.phase_duration_secs(),
            clock: format_clock(self.state.remaining_secs),
            progress: self.progress_fraction(),
            pomodoro_count_in_cycle: self.state.pomodoro_count_in_cycle,
            completed_pomodoros_total: self.state.completed_pomodoros_total,
            step_index: self.current_step_index(),
            cycle_progress_pct: self.cycle_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the countdown by one second.
    ///
    /// No-op while paused or during untimed recall. The tick that consumes
    /// the last second completes the phase, and the next phase starts at
    /// its full duration (no carry-over).
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running || !self.is_timed() {
            return self.outcome(None);
        }
        if self.state.remaining_secs <= 1 {
            let completed = self.complete_phase();
            return self.outcome(Some(completed));
        }
        self.state.remaining_secs -= 1;
        self.outcome(None)
    }

    /// Flip running/paused. Returns the new running flag.
    pub fn toggle_running(&mut self) -> bool {
        self.state.is_running = !self.state.is_running;
        self.state.is_running
    }

    /// Restart the current phase's countdown and stop the timer.
    pub fn reset_session(&mut self) {
        self.state.is_running = false;
        self.state.remaining_secs = self.phase_duration_secs();
    }

    /// Back to Pomodoro 1 with all counters cleared.
    pub fn reset_cycle(&mut self) {
        self.state = CycleState::fresh(&self.settings);
    }

    /// Validate and commit new settings, then restart the cycle.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidSettings` listing each offending field;
    /// the engine is left exactly as it was.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> Result<(), ValidationError> {
        settings.validate()?;
        tracing::info!(
            pomodoro_min = settings.pomodoro_duration_min,
            short_break_min = settings.short_break_duration_min,
            long_break_min = settings.long_break_duration_min,
            until_long_break = settings.pomodoros_until_long_break,
            active_recall = settings.active_recall_enabled,
            "timer settings applied"
        );
        self.settings = settings;
        self.reset_cycle();
        Ok(())
    }

    /// Keep the recall input buffer in sync with what the user has typed.
    pub fn set_recall_draft(&mut self, text: impl Into<String>) {
        self.state.recall_draft = text.into();
    }

    pub fn set_recall_topic(&mut self, topic: impl Into<String>) {
        self.state.recall_topic = topic.into();
    }

    /// Finish active recall with `text`, regardless of time left.
    ///
    /// # Errors
    /// `NotInActiveRecall` outside the recall phase, `EmptyRecallSummary`
    /// when `text` is blank.
    pub fn submit_active_recall(&mut self, text: &str) -> Result<TickOutcome, ValidationError> {
        if self.state.phase != Phase::ActiveRecall {
            return Err(ValidationError::NotInActiveRecall);
        }
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyRecallSummary);
        }
        let completed = self.complete_phase();
        Ok(self.outcome(Some(completed)))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn outcome(&self, completed: Option<CompletedPhase>) -> TickOutcome {
        TickOutcome {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            completed,
        }
    }

    fn complete_phase(&mut self) -> CompletedPhase {
        let from = self.state.phase;
        let duration_min = self.settings.phase_duration_min(from);
        self.transition();
        self.state.remaining_secs = self.phase_duration_secs();
        tracing::debug!(
            from = %from,
            to = %self.state.phase,
            count_in_cycle = self.state.pomodoro_count_in_cycle,
            completed_total = self.state.completed_pomodoros_total,
            "phase completed"
        );
        CompletedPhase {
            phase: from,
            duration_min,
            next_phase: self.state.phase,
        }
    }

    fn transition(&mut self) {
        let s = &mut self.state;
        match s.phase {
            Phase::Pomodoro => {
                s.completed_pomodoros_total += 1;
                if s.pomodoro_count_in_cycle + 1 < self.settings.pomodoros_until_long_break {
                    s.pomodoro_count_in_cycle += 1;
                    s.phase = Phase::ShortBreak;
                } else {
                    s.pomodoro_count_in_cycle = 0;
                    s.phase = Phase::LongBreak;
                }
            }
            Phase::ShortBreak => {
                s.phase = Phase::Pomodoro;
            }
            Phase::LongBreak if self.settings.active_recall_enabled => {
                s.recall_draft.clear();
                s.recall_topic = DEFAULT_RECALL_TOPIC.into();
                s.phase = Phase::ActiveRecall;
            }
            Phase::LongBreak | Phase::ActiveRecall => {
                s.recall_draft.clear();
                s.pomodoro_count_in_cycle = 0;
                s.phase = Phase::Pomodoro;
            }
        }
    }
}

impl Default for PhaseCycleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Format seconds as `MM:SS`. Minutes are not capped at 59.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
