//! Tabata - A state-managed HTTP service for interval training timers
//!
//! This is the main entry point for the tabata application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tabata::{
    api::create_router,
    config::Config,
    services::SettingsStore,
    state::AppState,
    tasks::ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tabata={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tabata server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, settings_file={}",
        config.host,
        config.port,
        config.settings_file.display()
    );

    // Load persisted settings and create application state
    let settings = SettingsStore::load(&config.settings_file);
    let state = Arc::new(AppState::new(config.port, config.host.clone(), settings));

    // Start the ticker background task
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        ticker_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start    - Start the interval sequence");
    info!("  POST /pause    - Toggle pause/resume");
    info!("  POST /reset    - Return the timer to idle");
    info!("  GET  /status   - Timer state, settings and server metadata");
    info!("  GET  /settings - Current settings");
    info!("  PUT  /settings - Update and persist settings");
    info!("  GET  /health   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
