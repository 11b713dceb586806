//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{TimerSettings, TimerSnapshot};

/// API response structure for timer control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a response for an actively counting timer
    pub fn running(message: String, timer: TimerSnapshot) -> Self {
        Self::new("running".to_string(), message, timer)
    }

    /// Create a response for a paused timer
    pub fn paused(message: String, timer: TimerSnapshot) -> Self {
        Self::new("paused".to_string(), message, timer)
    }

    /// Create a response for an idle timer
    pub fn ready(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ready".to_string(), message, timer)
    }

    /// Create a response for a just-completed sequence
    pub fn finished(message: String, timer: TimerSnapshot) -> Self {
        Self::new("finished".to_string(), message, timer)
    }
}

/// Full status response with settings and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub settings: TimerSettings,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
