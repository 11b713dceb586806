//! Display-facing view of the engine state

use serde::{Deserialize, Serialize};

use super::{IntervalEngine, Phase};

/// Everything the display layer needs to render one state change.
///
/// Published on the watch channel after every start, tick, pause/resume,
/// reset and finish, and returned by the control endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub current_set: u32,
    pub total_sets: u32,
    /// Whole seconds left in the active phase, for the big readout
    pub remaining_seconds: u64,
    /// Zero-padded mm:ss form of `remaining_seconds`
    pub remaining_display: String,
    /// Fraction of the active phase elapsed, 0.0 to 1.0
    pub progress: f64,
    pub running: bool,
    pub paused: bool,
    /// `work` / `rest` while running, `ready` otherwise
    pub label: String,
}

impl TimerSnapshot {
    pub fn of(engine: &IntervalEngine) -> Self {
        let remaining_seconds = engine.remaining().max(0.0).floor() as u64;
        let label = if engine.is_running() {
            engine.phase().label().to_string()
        } else {
            "ready".to_string()
        };

        Self {
            phase: engine.phase(),
            current_set: engine.current_set(),
            total_sets: engine.total_sets(),
            remaining_seconds,
            remaining_display: format_mm_ss(remaining_seconds),
            progress: engine.progress(),
            running: engine.is_running(),
            paused: engine.is_paused(),
            label,
        }
    }

    /// Snapshot of a freshly created engine, used to seed the watch channel
    pub fn idle() -> Self {
        Self::of(&IntervalEngine::new())
    }
}

/// Format whole seconds as zero-padded mm:ss
pub fn format_mm_ss(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
