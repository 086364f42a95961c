//! Error-to-response translation

use hyper::{Response, StatusCode};
use std::error::Error as StdError;
use std::fmt::Write as _;

use crate::config::{Config, DEFAULT_ERROR_MESSAGE};
use crate::http::body::ResponseBody;
use crate::http::response::{text_response, DefaultResponseFactory, ResponseFactory};
use crate::logger;

/// An error that may carry a numeric code, used as the response status
/// when it is a valid 4xx/5xx code
pub trait CodedError: StdError {
    fn code(&self) -> i64 {
        0
    }
}

impl CodedError for std::io::Error {
    fn code(&self) -> i64 {
        crate::Error::code_for_io(self)
    }
}

/// General purpose coded error
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    code: i64,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl HttpError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl CodedError for HttpError {
    fn code(&self) -> i64 {
        self.code
    }
}

/// Turns errors into plain-text responses
#[derive(Debug, Clone)]
pub struct ErrorResponder<F = DefaultResponseFactory> {
    factory: F,
    debug: bool,
    message: String,
}

impl Default for ErrorResponder {
    fn default() -> Self {
        Self::new(DefaultResponseFactory::new())
    }
}

impl ErrorResponder {
    pub fn from_config(config: &Config) -> Self {
        let mut responder = Self::new(DefaultResponseFactory::from_config(&config.http));
        responder.set_debug_mode(config.errors.debug);
        responder.set_message(config.errors.message.clone());
        responder
    }
}

impl<F: ResponseFactory> ErrorResponder<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            debug: false,
            message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn set_debug_mode(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub const fn is_debug_mode(&self) -> bool {
        self.debug
    }

    /// Body used outside debug mode
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a response from an error; never fails
    pub fn respond_with_error(&self, error: &dyn CodedError) -> Response<ResponseBody> {
        let status = status_code(error.code());
        logger::log_error_response(status.as_u16(), &error.to_string());

        let body = if self.debug {
            describe(error)
        } else {
            self.message.clone()
        };
        text_response(&self.factory, status, body)
    }
}

/// The code itself when it is a 4xx/5xx status, otherwise 500
pub fn status_code(code: i64) -> StatusCode {
    u16::try_from(code)
        .ok()
        .filter(|c| (400..600).contains(c))
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// The error message followed by its source chain
fn describe(error: &dyn CodedError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, "\nCaused by: {cause}");
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::io;

    async fn body_text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_quiet_body() {
        let mut responder = ErrorResponder::default();
        responder.set_message("message");
        let response = responder.respond_with_error(&HttpError::new(0, "foo"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "message");
    }

    #[tokio::test]
    async fn test_default_message() {
        let response = ErrorResponder::default().respond_with_error(&HttpError::new(0, "secret"));
        assert_eq!(body_text(response).await, "An error occurred");
    }

    #[tokio::test]
    async fn test_debug_body_includes_source_chain() {
        let mut responder = ErrorResponder::default();
        responder.set_debug_mode(true);
        assert!(responder.is_debug_mode());
        let error = HttpError::new(0, "string").with_source(io::Error::other("disk on fire"));
        let response = responder.respond_with_error(&error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "string\nCaused by: disk on fire");
    }

    #[tokio::test]
    async fn test_exception_status() {
        let mut responder = ErrorResponder::default();
        responder.set_message("message");
        let response = responder.respond_with_error(&HttpError::new(404, "foo"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "message");
    }

    #[test]
    fn test_status_code_bounds() {
        assert_eq!(status_code(400), StatusCode::BAD_REQUEST);
        assert_eq!(status_code(599).as_u16(), 599);
        assert_eq!(status_code(399), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_code(600), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_code(999), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_code(-404), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_code(0), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_crate_and_io_errors() {
        let responder = ErrorResponder::default();
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let response = responder.respond_with_error(&crate::Error::from(json));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(responder.respond_with_error(&missing).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_toml_str(
            "[http]\nserver_name = \"marshal\"\n[errors]\ndebug = true\nmessage = \"Oops\"\n",
        )
        .unwrap();
        let responder = ErrorResponder::from_config(&config);
        assert!(responder.is_debug_mode());
        assert_eq!(responder.message(), "Oops");
        let response = responder.respond_with_error(&HttpError::new(503, "down"));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[hyper::header::SERVER], "marshal");
    }
}
