//! Tracing initialisation.

use crate::config::LogConfig;
use crate::error::ApiClientError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
/// Output goes to stderr so command output on stdout stays machine-readable.
pub fn init_tracing(log: &LogConfig) -> Result<(), ApiClientError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .map_err(|e| ApiClientError::Config(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if log.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| ApiClientError::Config(format!("Failed to init subscriber: {}", e)))?;

    tracing::debug!(filter = %log.filter, json = log.json, "Tracing initialized");
    Ok(())
}
