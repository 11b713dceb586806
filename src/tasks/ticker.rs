//! Periodic pulse source background task

use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::time::{sleep, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::{
    services::notify_sequence_complete,
    state::{AppState, TickResult},
};

/// Reference cadence: four pulses per second
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Background task owning the one periodic trigger that drives `tick`.
///
/// The task sleeps on the control channel until the engine is running and
/// unpaused, then holds a `tokio::time::interval` for exactly one countdown
/// stretch. Pause, reset and completion all break the inner loop, dropping
/// the interval, so no recurring trigger can outlive the state it was
/// started for. Pulses are strictly sequential: each one runs to completion
/// under the engine lock before the next is taken.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting ticker task");

    let mut control_rx = state.control_tx.subscribe();

    loop {
        match control_rx.recv().await {
            Ok(event) => {
                debug!("Ticker received control event: {:?}", event);
                if !state.is_ticking() {
                    continue;
                }

                // A fresh interval completes its first tick immediately, so
                // start and resume re-evaluate the countdown right away
                // instead of stalling a full period.
                let mut interval = tokio::time::interval(TICK_INTERVAL);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut last_pulse = Instant::now();

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            // Decrement by measured wall time, not by the
                            // nominal cadence, so the countdown cannot drift
                            let dt = last_pulse.elapsed().as_secs_f64();
                            last_pulse = Instant::now();

                            match state.advance_tick(dt) {
                                Ok(TickResult::Finished { total_sets }) => {
                                    info!("Countdown complete, stopping pulse source");
                                    notify_sequence_complete(total_sets);
                                    break;
                                }
                                Ok(TickResult::Running) => {}
                                Ok(TickResult::Idle) => {
                                    debug!("Pulse arrived for an inactive timer, stopping pulse source");
                                    break;
                                }
                                Err(e) => {
                                    error!("Failed to advance timer tick: {}", e);
                                    break;
                                }
                            }
                        }

                        Ok(event) = control_rx.recv() => {
                            debug!("Ticker received control event mid-countdown: {:?}", event);
                            if !state.is_ticking() {
                                // Pause or reset cancels the pending trigger
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                error!("Error receiving control event: {}", e);
                // Wait a bit before retrying
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
