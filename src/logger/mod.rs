//! Logger module
//!
//! Provides logging utilities for the responders including:
//! - Subscriber installation driven by configuration
//! - Access logging for file responses
//! - Error and warning logging

use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Tracing target used for per-response access lines
pub const ACCESS_TARGET: &str = "http_marshal::access";

/// Initialize the global subscriber with configuration
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once at
/// application startup; a second call returns [`Error::Logger`].
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Logger(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Logger(e.to_string()))
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log a completed file response
pub fn log_file_response(path: &Path, status: u16, bytes: u64) {
    tracing::info!(
        target: ACCESS_TARGET,
        path = %path.display(),
        status,
        bytes,
        "file response"
    );
}

pub fn log_range_rejected(path: &Path, range: &str, file_size: u64) {
    tracing::debug!(
        path = %path.display(),
        range,
        file_size,
        "range not satisfiable"
    );
}

pub fn log_error_response(status: u16, error: &str) {
    tracing::debug!(status, error, "error translated to response");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        // An unparsable directive only matters when RUST_LOG is absent
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let cfg = LoggingConfig {
            level: "http_marshal=loud".to_string(),
            access_log: true,
        };
        assert!(matches!(init(&cfg), Err(Error::Logger(_))));
    }

    #[test]
    fn test_helpers_without_subscriber() {
        log_warning("no subscriber installed");
        log_file_response(Path::new("/tmp/x"), 200, 3);
        log_range_rejected(Path::new("/tmp/x"), "bytes=9-1", 3);
    }
}
