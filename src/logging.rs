//! `tracing` subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ChatConfig;
use crate::error::LoggingError;

/// Filter used when neither the config nor `RUST_LOG` provides one.
pub const DEFAULT_LOG_FILTER: &str = "info,console_chat=debug";

/// Resolve the filter: explicit directives first, then `RUST_LOG`, then the default.
pub fn env_filter(directives: Option<&str>) -> Result<EnvFilter, LoggingError> {
    match directives {
        Some(directives) => Ok(EnvFilter::try_new(directives)?),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))),
    }
}

/// Install the global fmt subscriber.
pub fn try_init(config: &ChatConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config.log_filter.as_deref())?;
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()?;

    tracing::debug!("tracing initialized");
    Ok(())
}

/// Like [`try_init`], but a second installation or a bad filter only prints
/// a warning.
pub fn init(config: &ChatConfig) {
    if let Err(error) = try_init(config) {
        eprintln!("console_chat: logging disabled: {error}");
    }
}
