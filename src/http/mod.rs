//! HTTP protocol layer module
//!
//! Range parsing, content-type detection, HTTP dates, body types and the
//! response factory shared by the responders.

pub mod body;
pub mod date;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{FileBody, ResponseBody};
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_404_response, build_416_response, text_response, DefaultResponseFactory,
    ResponseFactory,
};
