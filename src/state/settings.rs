//! Timer settings structure and boundary clamping

use serde::{Deserialize, Serialize};

pub const MIN_SETS: u32 = 1;
pub const MAX_SETS: u32 = 10;

/// Minutes and seconds fields each cap at 59, so a phase is at most 3599s
const MAX_COMPONENT: u32 = 59;

/// User-configured timer parameters.
///
/// Durations keep their minutes/seconds split so the persisted file mirrors
/// the two stepper fields the user edits. Values straight from disk or from
/// an API body may be out of range; every consumer goes through `clamped`,
/// so bad input is corrected at the boundary and never becomes an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub total_sets: u32,
    pub work_min: u32,
    pub work_sec: u32,
    pub rest_min: u32,
    pub rest_sec: u32,
    pub skip_last_rest: bool,
}

impl TimerSettings {
    /// Force every field into its valid range
    pub fn clamped(self) -> Self {
        Self {
            total_sets: self.total_sets.clamp(MIN_SETS, MAX_SETS),
            work_min: self.work_min.min(MAX_COMPONENT),
            work_sec: self.work_sec.min(MAX_COMPONENT),
            rest_min: self.rest_min.min(MAX_COMPONENT),
            rest_sec: self.rest_sec.min(MAX_COMPONENT),
            skip_last_rest: self.skip_last_rest,
        }
    }

    /// Combined work phase duration in seconds
    pub fn work_duration_secs(&self) -> u32 {
        self.work_min * 60 + self.work_sec
    }

    /// Combined rest phase duration in seconds
    pub fn rest_duration_secs(&self) -> u32 {
        self.rest_min * 60 + self.rest_sec
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            total_sets: 3,
            work_min: 0,
            work_sec: 30,
            rest_min: 0,
            rest_sec: 15,
            skip_last_rest: false,
        }
    }
}
