//! HTTP endpoint handlers

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info};

use crate::{
    services::notify_sequence_complete,
    state::{PauseResult, SharedState, StartResult, TimerSettings},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Handle POST /start - Begin an interval sequence
pub async fn start_handler(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start_timer() {
        Ok(StartResult::Started(timer)) => {
            info!("Start endpoint called - sequence running");
            Ok(Json(ApiResponse::running(
                "Timer sequence started".to_string(),
                timer,
            )))
        }
        Ok(StartResult::AlreadyRunning(timer)) => {
            info!("Start endpoint called while a sequence was already running");
            Ok(Json(ApiResponse::running(
                "Timer sequence already running".to_string(),
                timer,
            )))
        }
        Ok(StartResult::Finished(timer, total_sets)) => {
            // Zero-length configuration collapsed straight to done
            notify_sequence_complete(total_sets);
            Ok(Json(ApiResponse::finished(
                "Timer sequence finished immediately".to_string(),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /pause - Toggle pause/resume
pub async fn pause_handler(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.toggle_pause() {
        Ok(PauseResult::Toggled {
            paused: true,
            snapshot,
        }) => Ok(Json(ApiResponse::paused(
            "Timer paused".to_string(),
            snapshot,
        ))),
        Ok(PauseResult::Toggled {
            paused: false,
            snapshot,
        }) => Ok(Json(ApiResponse::running(
            "Timer resumed".to_string(),
            snapshot,
        ))),
        Ok(PauseResult::Idle(snapshot)) => Ok(Json(ApiResponse::ready(
            "Timer is idle, nothing to pause".to_string(),
            snapshot,
        ))),
        Err(e) => {
            error!("Failed to toggle pause: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Return the timer to idle
pub async fn reset_handler(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset_timer() {
        Ok(timer) => Ok(Json(ApiResponse::ready("Timer reset".to_string(), timer))),
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return timer state, settings and server metadata
pub async fn status_handler(
    State(state): State<SharedState>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to read timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let settings = match state.settings.read() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to read settings: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        settings,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /settings - Return current clamped settings
pub async fn get_settings_handler(
    State(state): State<SharedState>,
) -> Result<Json<TimerSettings>, StatusCode> {
    match state.settings.read() {
        Ok(settings) => Ok(Json(settings)),
        Err(e) => {
            error!("Failed to read settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /settings - Persist new settings, echoing the clamped values
pub async fn put_settings_handler(
    State(state): State<SharedState>,
    Json(settings): Json<TimerSettings>,
) -> Result<Json<TimerSettings>, StatusCode> {
    match state.settings.persist(settings) {
        Ok(stored) => {
            info!(
                "Settings updated: {} sets, work {}s, rest {}s, skip_last_rest {}",
                stored.total_sets,
                stored.work_duration_secs(),
                stored.rest_duration_secs(),
                stored.skip_last_rest
            );
            Ok(Json(stored))
        }
        Err(e) => {
            error!("Failed to persist settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
