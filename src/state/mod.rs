//! State management module
//!
//! This module contains the timer engine, its settings model, the display
//! snapshot and the shared application state wrapping them.

pub mod app_state;
pub mod engine;
pub mod settings;
pub mod snapshot;

// Re-export main types
pub use app_state::{AppState, ControlEvent, PauseResult, SharedState, StartResult, TickResult};
pub use engine::{IntervalEngine, Phase, TickOutcome};
pub use settings::TimerSettings;
pub use snapshot::TimerSnapshot;
