//! Server binary for the event tracking service.
//!
//! Wires configuration, logging, the in-memory aggregator, and the HTTP
//! API together, then serves until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `eventtrack-config.yaml` (or the path in
//!    `EVENTTRACK_CONFIG`); fall back to defaults when the file is absent
//! 2. Initialize structured logging (tracing)
//! 3. Create the aggregator on the system clock
//! 4. Serve the API until a shutdown signal arrives

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eventtrack_api::{start_server, AppState, ServerConfig};
use eventtrack_core::config::{LogFormat, LoggingConfig, ServiceConfig};
use eventtrack_core::EventAggregator;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServiceError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "eventtrack-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be
/// installed, or the server fails to bind or serve.
#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // 1. Load configuration.
    let path = config_path();
    let (config, from_file) = load_config(&path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;

    info!("eventtrack-server starting");
    if from_file {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }
    info!(
        window_ms = config.window.duration_ms,
        y_min = config.validation.y_min,
        y_max = config.validation.y_max,
        x_max_fraction_digits = config.validation.x_max_fraction_digits,
        "Window configured"
    );

    // 3. Create the aggregator.
    let aggregator = Arc::new(EventAggregator::with_system_clock(&config));
    let state = Arc::new(AppState::new(aggregator));

    // 4. Serve until shutdown.
    let server_config = ServerConfig::from(&config.server);
    start_server(&server_config, state, shutdown_signal()).await?;

    info!("eventtrack-server shutdown complete");
    Ok(())
}

/// Resolve the configuration file path.
fn config_path() -> PathBuf {
    std::env::var_os("EVENTTRACK_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration from `path`, or defaults when the file does not
/// exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(ServiceConfig, bool), ServiceError> {
    if path.exists() {
        Ok((ServiceConfig::from_file(path)?, true))
    } else {
        let mut config = ServiceConfig::default();
        config.server.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), ServiceError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    result.map_err(|e| ServiceError::Logging {
        message: e.to_string(),
    })
}

/// Resolve on `Ctrl-C`, or on `SIGTERM` where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
