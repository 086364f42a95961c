//! Crate error type

use std::io;

use crate::output::error::CodedError;

/// Errors raised while loading configuration or marshalling requests
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed request body: {0}")]
    Form(String),

    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("logger initialisation failed: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn code_for_io(error: &io::Error) -> i64 {
        match error.kind() {
            io::ErrorKind::NotFound => 404,
            io::ErrorKind::PermissionDenied => 403,
            _ => 0,
        }
    }
}

impl CodedError for Error {
    fn code(&self) -> i64 {
        match self {
            Self::Json(_) | Self::Form(_) => 400,
            Self::Io(e) => Self::code_for_io(e),
            _ => 0,
        }
    }
}
