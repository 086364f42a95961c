//! Response marshalling
//!
//! Responders that turn errors and files into HTTP responses through an
//! injected [`ResponseFactory`](crate::http::ResponseFactory).

pub mod error;
pub mod file;

pub use error::{status_code, CodedError, ErrorResponder, HttpError};
pub use file::FileResponder;
