// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub files: FilesConfig,
    pub errors: ErrorsConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "http_marshal=debug")
    pub level: String,
    /// Emit one line per file response
    pub access_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            access_log: true,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Value of the `Server` header, omitted when unset
    pub server_name: Option<String>,
}

/// Static file configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FilesConfig {
    /// Answer `Range` requests with 206/416
    pub serve_ranges: bool,
    /// Read size used when streaming file bodies
    pub chunk_size: usize,
}

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            serve_ranges: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Error response configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ErrorsConfig {
    /// Render full error detail instead of `message`
    pub debug: bool,
    /// Body used when not in debug mode
    pub message: String,
}

pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            debug: false,
            message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}
