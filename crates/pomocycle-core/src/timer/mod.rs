mod engine;
mod phase;
mod settings;
mod steps;

pub use engine::{format_clock, CompletedPhase, CycleState, PhaseCycleEngine, TickOutcome};
pub use phase::Phase;
pub use settings::TimerSettings;
pub use steps::{
    build_progress_steps, current_step_index, cycle_progress_pct, step_count, ProgressStep,
};
