//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::services::SettingsStore;
use super::{IntervalEngine, TickOutcome, TimerSnapshot};

/// Control-plane events that drive the ticker task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Started,
    PauseToggled { paused: bool },
    Reset,
    Finished,
}

/// What a start request did
#[derive(Debug, Clone, PartialEq)]
pub enum StartResult {
    /// Sequence began; the ticker should run
    Started(TimerSnapshot),
    /// A sequence was already in progress; nothing changed
    AlreadyRunning(TimerSnapshot),
    /// Every phase was zero-length and the sequence collapsed to done
    Finished(TimerSnapshot, u32),
}

/// What a pause request did
#[derive(Debug, Clone, PartialEq)]
pub enum PauseResult {
    Toggled { paused: bool, snapshot: TimerSnapshot },
    /// Timer was idle; pause has nothing to act on
    Idle(TimerSnapshot),
}

/// What one delivered pulse did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// Pulse arrived while idle or paused
    Idle,
    /// Countdown advanced, possibly across a phase boundary
    Running,
    /// The sequence completed on this pulse
    Finished { total_sets: u32 },
}

/// Main application state funnelling every timer mutation through the engine.
///
/// Nothing outside this type touches engine fields; handlers and the ticker
/// call the operations below, which publish a fresh snapshot on the watch
/// channel after every state change and feed the ticker through the control
/// broadcast.
#[derive(Debug)]
pub struct AppState {
    /// The phase/set state machine
    engine: Mutex<IntervalEngine>,
    /// Persisted user settings, re-read at start and at phase boundaries
    pub settings: SettingsStore,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel driving the ticker task
    pub control_tx: broadcast::Sender<ControlEvent>,
    /// Channel carrying display snapshots
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    pub fn new(port: u16, host: String, settings: SettingsStore) -> Self {
        let (control_tx, _) = broadcast::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::idle());

        Self {
            engine: Mutex::new(IntervalEngine::new()),
            settings,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            control_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Begin a sequence from the current settings. No-op while running.
    pub fn start_timer(&self) -> Result<StartResult, String> {
        let settings = self.settings.read()?;
        let total_sets = settings.total_sets;

        let mut engine = self.lock_engine()?;
        if !engine.start(&settings) {
            return Ok(StartResult::AlreadyRunning(TimerSnapshot::of(&engine)));
        }

        let snapshot = TimerSnapshot::of(&engine);
        let finished = !engine.is_running();
        drop(engine);

        self.publish(snapshot.clone());
        if finished {
            // All-zero configuration: the start collapsed straight to done
            info!("Timer sequence finished immediately (all phases zero-length)");
            self.record_action("finished");
            self.send_control(ControlEvent::Finished);
            return Ok(StartResult::Finished(snapshot, total_sets));
        }

        info!("Timer sequence started: {} sets", total_sets);
        self.record_action("start");
        self.send_control(ControlEvent::Started);
        Ok(StartResult::Started(snapshot))
    }

    /// Toggle pause/resume. No-op while idle.
    pub fn toggle_pause(&self) -> Result<PauseResult, String> {
        let mut engine = self.lock_engine()?;
        let toggled = engine.toggle_pause();
        let snapshot = TimerSnapshot::of(&engine);
        drop(engine);

        match toggled {
            Some(paused) => {
                info!("Timer {}", if paused { "paused" } else { "resumed" });
                self.publish(snapshot.clone());
                self.record_action(if paused { "pause" } else { "resume" });
                self.send_control(ControlEvent::PauseToggled { paused });
                Ok(PauseResult::Toggled { paused, snapshot })
            }
            None => Ok(PauseResult::Idle(snapshot)),
        }
    }

    /// Return to canonical idle from any state
    pub fn reset_timer(&self) -> Result<TimerSnapshot, String> {
        let mut engine = self.lock_engine()?;
        engine.reset();
        let snapshot = TimerSnapshot::of(&engine);
        drop(engine);

        info!("Timer reset");
        self.publish(snapshot.clone());
        self.record_action("reset");
        self.send_control(ControlEvent::Reset);
        Ok(snapshot)
    }

    /// Deliver one pulse from the ticker. `dt` is the wall time since the
    /// previous pulse. Settings are re-read so boundary transitions pick up
    /// live edits.
    pub fn advance_tick(&self, dt: f64) -> Result<TickResult, String> {
        let settings = self.settings.read()?;

        let mut engine = self.lock_engine()?;
        let total_sets = engine.total_sets();
        let outcome = engine.tick(&settings, dt);
        let snapshot = TimerSnapshot::of(&engine);
        drop(engine);

        match outcome {
            TickOutcome::Idle => Ok(TickResult::Idle),
            TickOutcome::Ticked | TickOutcome::Transitioned => {
                self.publish(snapshot);
                Ok(TickResult::Running)
            }
            TickOutcome::Finished => {
                info!("Timer sequence finished: {} sets", total_sets);
                self.publish(snapshot);
                self.record_action("finished");
                self.send_control(ControlEvent::Finished);
                Ok(TickResult::Finished { total_sets })
            }
        }
    }

    /// Current display snapshot
    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.lock_engine().map(|engine| TimerSnapshot::of(&engine))
    }

    /// True when the ticker should currently be delivering pulses
    pub fn is_ticking(&self) -> bool {
        self.lock_engine()
            .map(|engine| engine.is_ticking())
            .unwrap_or(false)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn lock_engine(&self) -> Result<std::sync::MutexGuard<'_, IntervalEngine>, String> {
        self.engine
            .lock()
            .map_err(|e| format!("Failed to lock engine: {}", e))
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
    }

    fn send_control(&self, event: ControlEvent) {
        if let Err(e) = self.control_tx.send(event) {
            // No receiver just means the ticker task has not subscribed yet
            warn!("Failed to send control event {:?}: {}", event, e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }
}

/// Shared handle used by the router, handlers and the ticker task
pub type SharedState = Arc<AppState>;
