//! HTTP response building module
//!
//! Responders never construct responses directly: they ask an injected
//! [`ResponseFactory`] so the host application controls common headers.

use hyper::ext::ReasonPhrase;
use hyper::header::{HeaderValue, CONTENT_RANGE, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};

use super::body::ResponseBody;
use super::range::unsatisfied_content_range;
use crate::config::HttpConfig;
use crate::logger;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Creates empty responses for the responders
pub trait ResponseFactory: Send + Sync {
    /// Build a response with `status` and an empty body.
    /// An empty `reason_phrase` keeps the canonical one.
    fn create_response(&self, status: StatusCode, reason_phrase: &str) -> Response<ResponseBody>;
}

impl<F: ResponseFactory + ?Sized> ResponseFactory for &F {
    fn create_response(&self, status: StatusCode, reason_phrase: &str) -> Response<ResponseBody> {
        (**self).create_response(status, reason_phrase)
    }
}

impl<F: ResponseFactory + ?Sized> ResponseFactory for std::sync::Arc<F> {
    fn create_response(&self, status: StatusCode, reason_phrase: &str) -> Response<ResponseBody> {
        (**self).create_response(status, reason_phrase)
    }
}

/// Factory used when none is injected
#[derive(Debug, Clone, Default)]
pub struct DefaultResponseFactory {
    server_name: Option<HeaderValue>,
}

impl DefaultResponseFactory {
    pub const fn new() -> Self {
        Self { server_name: None }
    }

    /// Stamp every response with a `Server` header
    pub fn with_server_name(mut self, server_name: &str) -> Self {
        match HeaderValue::from_str(server_name) {
            Ok(value) => self.server_name = Some(value),
            Err(e) => logger::log_warning(&format!(
                "Ignoring invalid server name '{server_name}': {e}"
            )),
        }
        self
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        match config.server_name.as_deref() {
            Some(name) => Self::new().with_server_name(name),
            None => Self::new(),
        }
    }
}

impl ResponseFactory for DefaultResponseFactory {
    fn create_response(&self, status: StatusCode, reason_phrase: &str) -> Response<ResponseBody> {
        let mut response = Response::new(ResponseBody::Empty);
        *response.status_mut() = status;

        if let Some(server) = &self.server_name {
            response.headers_mut().insert(SERVER, server.clone());
        }

        if !reason_phrase.is_empty() {
            match ReasonPhrase::try_from(reason_phrase.to_owned()) {
                Ok(reason) => {
                    response.extensions_mut().insert(reason);
                }
                Err(e) => logger::log_warning(&format!(
                    "Ignoring invalid reason phrase '{reason_phrase}': {e}"
                )),
            }
        }

        response
    }
}

/// Build 404 Not Found response
pub fn build_404_response(factory: &impl ResponseFactory) -> Response<ResponseBody> {
    text_response(factory, StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(
    factory: &impl ResponseFactory,
    file_size: u64,
) -> Response<ResponseBody> {
    let mut response = text_response(
        factory,
        StatusCode::RANGE_NOT_SATISFIABLE,
        "Range Not Satisfiable",
    );
    insert_header(&mut response, CONTENT_RANGE, &unsatisfied_content_range(file_size));
    response
}

/// Build a `text/plain` response
pub fn text_response(
    factory: &impl ResponseFactory,
    status: StatusCode,
    text: impl Into<String>,
) -> Response<ResponseBody> {
    let mut response = factory.create_response(status, "");
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    *response.body_mut() = ResponseBody::text(text);
    response
}

/// Set a header, logging values that are not valid header text
pub fn insert_header(
    response: &mut Response<ResponseBody>,
    name: hyper::header::HeaderName,
    value: &str,
) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            response.headers_mut().insert(name, v);
        }
        Err(e) => log_build_error(name.as_str(), &e),
    }
}

/// Log response build error
fn log_build_error(header: &str, error: &impl std::fmt::Display) {
    logger::log_error(&format!("Failed to set {header} header: {error}"));
}
