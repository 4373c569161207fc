//! Turnero: a live, shared walk-in queue.
//!
//! This is the process entry point. It loads configuration, initializes
//! logging, creates the single shared state store, and serves the
//! `WebSocket`, REST, and static UI routes until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `turnero-config.yaml` (or `TURNERO_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Resolve the civil calendar for daily stats rollover
//! 4. Create the state store and shared application state
//! 5. Serve until a shutdown signal arrives

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use turnero_core::config::{LogFormat, TurneroConfig};
use turnero_core::{StateStore, SystemClock};
use turnero_server::AppState;

use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "turnero-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging, or the server fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config)?;
    info!(
        source = %config_source,
        host = config.server.host,
        port = config.server.port,
        timezone = config.calendar.timezone,
        "turnero starting"
    );

    // 3. Resolve the civil calendar.
    let calendar = config.calendar.civil_calendar()?;

    // 4. Create the store and shared state.
    let store = StateStore::new(Arc::new(SystemClock), calendar);
    info!(today = %store.today(), "State store initialized");
    let state = Arc::new(AppState::new(store, config.server.broadcast_capacity));

    // 5. Serve.
    turnero_server::start_server(&config.server, state, shutdown_signal()).await?;

    info!("turnero shutdown complete");
    Ok(())
}

/// Load configuration from the file named by `TURNERO_CONFIG`, or from
/// `turnero-config.yaml` in the working directory. Falls back to defaults
/// (still honouring environment overrides) when the file does not exist.
///
/// Returns the config and a description of where it came from, for the
/// startup log line (logging is not up yet).
fn load_config() -> Result<(TurneroConfig, String), AppError> {
    let config_path = std::env::var("TURNERO_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = TurneroConfig::from_file(&config_path)?;
        Ok((config, config_path.display().to_string()))
    } else {
        Ok((TurneroConfig::from_env()?, String::from("defaults")))
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(config: &TurneroConfig) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.logging.level).map_err(|e| AppError::Logging {
            message: format!("invalid log level {:?}: {e}", config.logging.level),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match config.logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

/// Resolve on `Ctrl-C`, or on `SIGTERM` where that exists.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Shutdown signal received");
}
