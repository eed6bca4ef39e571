//! # Pomocycle Core Library
//!
//! This library provides the phase-cycle logic for the Pomocycle pomodoro
//! timer. The CLI binary is a thin driver over the same engine.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine cycling through pomodoros,
//!   short breaks, a long break and optional active recall. The caller
//!   supplies one `tick()` per elapsed second.
//! - **Storage**: TOML-based settings and an SQLite log of completed phases,
//!   both behind small traits so the engine never performs I/O itself.
//!
//! ## Key Components
//!
//! - [`PhaseCycleEngine`]: Core timer state machine
//! - [`TimerSettings`]: Validated timer configuration
//! - [`Database`]: Completed-phase persistence and statistics
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, SettingsField, ValidationError};
pub use events::Event;
pub use storage::{
    AnalyticsSink, Config, Database, FileSettingsStore, MemoryAnalytics, MemorySettingsStore,
    SettingsStore, Stats,
};
pub use timer::{
    CompletedPhase, CycleState, Phase, PhaseCycleEngine, ProgressStep, TickOutcome, TimerSettings,
};
