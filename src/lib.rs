//! http-marshal
//!
//! Marshalling helpers between HTTP messages and application code:
//! request inputs are collapsed into a single map, and errors and files
//! are turned into responses.

pub mod config;
pub mod error;
pub mod http;
pub mod input;
pub mod logger;
pub mod output;

pub use config::Config;
pub use error::{Error, Result};
pub use input::{get_request_input, InputMap, InputValue, ServerRequest};
pub use output::{CodedError, ErrorResponder, FileResponder};
