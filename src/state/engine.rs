//! Interval timer engine - the phase/set state machine

use serde::{Deserialize, Serialize};

use super::TimerSettings;

/// Remaining time below this threshold counts as a phase end. Matches the
/// comparison constant the countdown has always used at 250ms cadence.
pub const PHASE_EPSILON: f64 = 0.001;

/// The two sub-periods composing one set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

impl Phase {
    /// Status label shown while this phase is counting down
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Rest => "rest",
        }
    }
}

/// What a single engine operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Pulse arrived while idle or paused; nothing changed
    Idle,
    /// Countdown advanced within the current phase
    Ticked,
    /// A phase or set boundary was crossed
    Transitioned,
    /// The whole sequence completed; engine is back at canonical idle
    Finished,
}

/// Owns all run state of one interval timer sequence.
///
/// Every mutation goes through `start`, `toggle_pause`, `reset` and `tick`;
/// there is no other way to move the machine. The engine is synchronous and
/// does no I/O - the ticker task supplies pulses, `AppState` supplies the
/// current settings and publishes the resulting snapshots.
#[derive(Debug)]
pub struct IntervalEngine {
    phase: Phase,
    current_set: u32,
    remaining: f64,
    /// Configured duration of the active phase, snapshotted at phase entry
    phase_length: f64,
    /// Snapshotted at start; duration edits apply at boundaries, set edits don't
    total_sets: u32,
    running: bool,
    paused: bool,
}

impl IntervalEngine {
    /// Create an engine in the canonical idle state
    pub fn new() -> Self {
        Self {
            phase: Phase::Work,
            current_set: 0,
            remaining: 0.0,
            phase_length: 0.0,
            total_sets: 0,
            running: false,
            paused: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True when pulses should currently decrement the countdown
    pub fn is_ticking(&self) -> bool {
        self.running && !self.paused
    }

    /// Fraction of the active phase already elapsed, clamped to [0, 1].
    /// Zero-length phases report 0; they are skipped and never visible.
    pub fn progress(&self) -> f64 {
        if self.phase_length <= 0.0 {
            return 0.0;
        }
        ((self.phase_length - self.remaining) / self.phase_length).clamp(0.0, 1.0)
    }

    /// Begin a sequence with the given settings. Returns `false` without
    /// touching anything if a sequence is already running.
    pub fn start(&mut self, settings: &TimerSettings) -> bool {
        if self.running {
            return false;
        }

        self.total_sets = settings.total_sets;
        self.current_set = 0;
        self.running = true;
        self.paused = false;

        // Entering set 1 is the same move as leaving a rest segment, so the
        // advancement chain covers starting too, zero-length work included.
        self.phase = Phase::Rest;
        self.advance(settings);
        true
    }

    /// Toggle between Paused and Running. Returns the new paused flag, or
    /// `None` when the engine is idle and the call was a no-op.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        if !self.running {
            return None;
        }
        self.paused = !self.paused;
        Some(self.paused)
    }

    /// Return to canonical idle from any state. Idempotent.
    pub fn reset(&mut self) {
        self.running = false;
        self.paused = false;
        self.current_set = 0;
        self.remaining = 0.0;
        self.phase_length = 0.0;
        self.phase = Phase::Work;
    }

    /// Deliver one pulse. `dt` is the wall time elapsed since the previous
    /// pulse in seconds, so the countdown cannot drift from the cadence.
    /// Settings are the live values; they only take effect when the pulse
    /// crosses a phase boundary.
    pub fn tick(&mut self, settings: &TimerSettings, dt: f64) -> TickOutcome {
        if !self.is_ticking() {
            return TickOutcome::Idle;
        }

        self.remaining -= dt;
        if self.remaining > PHASE_EPSILON {
            return TickOutcome::Ticked;
        }

        // Phase ended; never let a negative value become observable
        self.remaining = 0.0;
        self.advance(settings)
    }

    /// Run the set/phase advancement rule from the end of the current phase
    /// segment, skipping zero-length phases until a nonzero phase begins or
    /// the sequence finishes.
    ///
    /// Each pass through the Rest arm either finishes or increments
    /// `current_set`, so the chain terminates within `2 * total_sets + 2`
    /// passes even when every duration is zero.
    fn advance(&mut self, settings: &TimerSettings) -> TickOutcome {
        let mut budget = 2 * self.total_sets + 2;
        loop {
            debug_assert!(budget > 0, "phase skip chain did not terminate");
            if budget == 0 {
                return self.finish();
            }
            budget -= 1;

            match self.phase {
                Phase::Work => {
                    // Work segment over. The final set may drop its rest.
                    if self.current_set >= self.total_sets && settings.skip_last_rest {
                        return self.finish();
                    }
                    self.phase = Phase::Rest;
                    let rest = settings.rest_duration_secs();
                    if rest > 0 {
                        self.begin_phase(rest);
                        return TickOutcome::Transitioned;
                    }
                    // zero-length rest: fall through to the rest-end rule
                }
                Phase::Rest => {
                    // Rest segment over; after the final set the sequence ends
                    if self.current_set >= self.total_sets {
                        return self.finish();
                    }
                    self.current_set += 1;
                    self.phase = Phase::Work;
                    let work = settings.work_duration_secs();
                    if work > 0 {
                        self.begin_phase(work);
                        return TickOutcome::Transitioned;
                    }
                    // zero-length work: fall through to the work-end rule
                }
            }
        }
    }

    fn begin_phase(&mut self, duration_secs: u32) {
        self.remaining = f64::from(duration_secs);
        self.phase_length = f64::from(duration_secs);
    }

    fn finish(&mut self) -> TickOutcome {
        self.reset();
        TickOutcome::Finished
    }
}

impl Default for IntervalEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.25;

    fn settings(total_sets: u32, work: u32, rest: u32, skip_last_rest: bool) -> TimerSettings {
        TimerSettings {
            total_sets,
            work_min: work / 60,
            work_sec: work % 60,
            rest_min: rest / 60,
            rest_sec: rest % 60,
            skip_last_rest,
        }
        .clamped()
    }

    fn assert_idle(engine: &IntervalEngine) {
        assert!(!engine.is_running());
        assert!(!engine.is_paused());
        assert_eq!(engine.current_set(), 0);
        assert_eq!(engine.remaining(), 0.0);
        assert_eq!(engine.phase(), Phase::Work);
    }

    /// Drive pulses until the sequence finishes, recording each boundary
    fn run_to_completion(
        engine: &mut IntervalEngine,
        settings: &TimerSettings,
        max_pulses: u32,
    ) -> (u32, Vec<(Phase, u32)>) {
        let mut trace = vec![(engine.phase(), engine.current_set())];
        for pulse in 1..=max_pulses {
            match engine.tick(settings, DT) {
                TickOutcome::Finished => return (pulse, trace),
                TickOutcome::Transitioned => trace.push((engine.phase(), engine.current_set())),
                TickOutcome::Ticked => {}
                TickOutcome::Idle => panic!("pulse ignored while running"),
            }
        }
        panic!("sequence did not finish within {} pulses", max_pulses);
    }

    #[test]
    fn new_engine_is_canonical_idle() {
        assert_idle(&IntervalEngine::new());
    }

    #[test]
    fn start_enters_work_of_set_one() {
        let s = settings(3, 30, 15, false);
        let mut engine = IntervalEngine::new();
        assert!(engine.start(&s));

        assert!(engine.is_running());
        assert!(!engine.is_paused());
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.current_set(), 1);
        assert_eq!(engine.total_sets(), 3);
        assert_eq!(engine.remaining(), 30.0);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let s = settings(3, 30, 15, false);
        let mut engine = IntervalEngine::new();
        assert!(engine.start(&s));
        engine.tick(&s, DT);
        let before = engine.remaining();

        assert!(!engine.start(&s));
        assert_eq!(engine.remaining(), before);
        assert_eq!(engine.current_set(), 1);
    }

    #[test]
    fn reset_is_idempotent_from_any_state() {
        let s = settings(2, 5, 5, false);

        let mut engine = IntervalEngine::new();
        engine.reset();
        assert_idle(&engine);

        engine.start(&s);
        engine.tick(&s, DT);
        engine.reset();
        assert_idle(&engine);

        engine.start(&s);
        engine.toggle_pause();
        engine.reset();
        assert_idle(&engine);

        engine.reset();
        assert_idle(&engine);
    }

    #[test]
    fn countdown_strictly_decreases_between_boundaries() {
        let s = settings(1, 5, 0, true);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        let mut previous = engine.remaining();
        for _ in 0..19 {
            assert_eq!(engine.tick(&s, DT), TickOutcome::Ticked);
            assert!(engine.remaining() < previous);
            assert!(engine.remaining() >= 0.0);
            previous = engine.remaining();
        }
    }

    #[test]
    fn current_set_stays_within_bounds() {
        let s = settings(3, 1, 1, false);
        let mut engine = IntervalEngine::new();
        assert_eq!(engine.current_set(), 0);

        engine.start(&s);
        loop {
            assert!(engine.current_set() >= 1);
            assert!(engine.current_set() <= engine.total_sets());
            if engine.tick(&s, DT) == TickOutcome::Finished {
                break;
            }
        }
        assert_eq!(engine.current_set(), 0);
    }

    #[test]
    fn zero_work_skips_straight_to_rest() {
        let s = settings(2, 0, 5, false);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        // Work never becomes visible with a zero remaining
        assert_eq!(engine.phase(), Phase::Rest);
        assert_eq!(engine.current_set(), 1);
        assert_eq!(engine.remaining(), 5.0);
    }

    #[test]
    fn skip_last_rest_finishes_straight_from_final_work() {
        let s = settings(1, 10, 10, true);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        for _ in 0..39 {
            assert_eq!(engine.tick(&s, DT), TickOutcome::Ticked);
        }
        // 40th pulse drains the work phase; rest is bypassed entirely
        assert_eq!(engine.tick(&s, DT), TickOutcome::Finished);
        assert_idle(&engine);
    }

    #[test]
    fn full_cycle_trace_two_sets() {
        let s = settings(2, 5, 5, false);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        let (pulses, trace) = run_to_completion(&mut engine, &s, 200);
        assert_eq!(pulses, 80);
        assert_eq!(
            trace,
            vec![
                (Phase::Work, 1),
                (Phase::Rest, 1),
                (Phase::Work, 2),
                (Phase::Rest, 2),
            ]
        );
        assert_idle(&engine);
    }

    #[test]
    fn pause_freezes_remaining() {
        let s = settings(1, 30, 0, true);
        let mut engine = IntervalEngine::new();
        engine.start(&s);
        engine.tick(&s, DT);
        let frozen = engine.remaining();

        assert_eq!(engine.toggle_pause(), Some(true));
        for _ in 0..10 {
            assert_eq!(engine.tick(&s, DT), TickOutcome::Idle);
        }
        assert_eq!(engine.remaining(), frozen);

        assert_eq!(engine.toggle_pause(), Some(false));
        assert_eq!(engine.tick(&s, DT), TickOutcome::Ticked);
        assert!(engine.remaining() < frozen);
    }

    #[test]
    fn pause_while_idle_is_a_no_op() {
        let mut engine = IntervalEngine::new();
        assert_eq!(engine.toggle_pause(), None);
        assert_idle(&engine);
    }

    #[test]
    fn all_zero_configuration_finishes_immediately() {
        let s = settings(1, 0, 0, false);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        // start() collapses the whole sequence; no phase ever became visible
        assert_idle(&engine);
    }

    #[test]
    fn all_zero_multi_set_chain_terminates() {
        let s = settings(10, 0, 0, false);
        let mut engine = IntervalEngine::new();
        engine.start(&s);
        assert_idle(&engine);
    }

    #[test]
    fn zero_work_on_final_set_honors_skip_last_rest() {
        let s = settings(1, 0, 5, true);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        // The work end of the final set applies the skip uniformly, so the
        // zero-length work collapses the sequence without a rest.
        assert_idle(&engine);
    }

    #[test]
    fn zero_rest_chains_into_next_work() {
        let s = settings(2, 5, 0, false);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        for _ in 0..19 {
            engine.tick(&s, DT);
        }
        assert_eq!(engine.tick(&s, DT), TickOutcome::Transitioned);
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.current_set(), 2);
        assert_eq!(engine.remaining(), 5.0);
    }

    #[test]
    fn duration_edits_apply_at_the_next_boundary() {
        let before = settings(2, 5, 5, false);
        let mut engine = IntervalEngine::new();
        engine.start(&before);

        // Mid-phase edit: the active work phase keeps its snapshot
        let after = settings(2, 5, 8, false);
        engine.tick(&after, DT);
        assert_eq!(engine.remaining(), 4.75);

        for _ in 0..19 {
            engine.tick(&after, DT);
        }
        // The boundary re-read picks up the new rest duration
        assert_eq!(engine.phase(), Phase::Rest);
        assert_eq!(engine.remaining(), 8.0);
    }

    #[test]
    fn progress_runs_zero_to_one_within_a_phase() {
        let s = settings(1, 4, 0, true);
        let mut engine = IntervalEngine::new();
        assert_eq!(engine.progress(), 0.0);

        engine.start(&s);
        assert_eq!(engine.progress(), 0.0);

        for _ in 0..8 {
            engine.tick(&s, DT);
        }
        assert!((engine.progress() - 0.5).abs() < 1e-9);

        for _ in 0..7 {
            engine.tick(&s, DT);
        }
        assert!(engine.progress() > 0.9);
    }

    #[test]
    fn fractional_overshoot_never_shows_negative_remaining() {
        let s = settings(1, 1, 0, true);
        let mut engine = IntervalEngine::new();
        engine.start(&s);

        // Irregular pulse lengths overshoot the boundary
        engine.tick(&s, 0.7);
        assert!(engine.remaining() >= 0.0);
        assert_eq!(engine.tick(&s, 0.7), TickOutcome::Finished);
        assert_eq!(engine.remaining(), 0.0);
    }
}
