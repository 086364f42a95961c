//! Static file responses with single byte-range support

use hyper::header::{
    HeaderMap, HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, IF_RANGE,
    LAST_MODIFIED, RANGE,
};
use hyper::{Response, StatusCode};
use std::io::SeekFrom;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::{Config, DEFAULT_CHUNK_SIZE};
use crate::http::body::{FileBody, ResponseBody};
use crate::http::date::{format_http_date, http_date_matches};
use crate::http::mime::{self, SNIFF_LEN};
use crate::http::range::{parse_range_header, RangeParseResult};
use crate::http::response::{
    build_404_response, build_416_response, insert_header, DefaultResponseFactory, ResponseFactory,
};
use crate::logger;

/// Serves files from disk, honouring `Range` requests when enabled
#[derive(Debug, Clone)]
pub struct FileResponder<F = DefaultResponseFactory> {
    factory: F,
    serve_ranges: bool,
    access_log: bool,
    chunk_size: usize,
}

impl Default for FileResponder {
    fn default() -> Self {
        Self::new(DefaultResponseFactory::new())
    }
}

impl FileResponder {
    pub fn from_config(config: &Config) -> Self {
        let mut responder = Self::new(DefaultResponseFactory::from_config(&config.http));
        responder.set_can_serve_bytes(config.files.serve_ranges);
        responder.set_access_log(config.logging.access_log);
        responder.set_chunk_size(config.files.chunk_size);
        responder
    }
}

impl<F: ResponseFactory> FileResponder<F> {
    pub const fn new(factory: F) -> Self {
        Self {
            factory,
            serve_ranges: true,
            access_log: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Enable or disable byte-range serving
    pub fn set_can_serve_bytes(&mut self, serve_ranges: bool) {
        self.serve_ranges = serve_ranges;
    }

    pub const fn can_serve_bytes(&self) -> bool {
        self.serve_ranges
    }

    pub fn set_access_log(&mut self, access_log: bool) {
        self.access_log = access_log;
    }

    /// Read size for file bodies, at least one byte
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    /// Respond with the file at `path`
    ///
    /// Anything that is not a readable regular file yields 404. With range
    /// serving enabled a single satisfiable `Range` yields 206, an
    /// unsatisfiable one 416; everything else gets the whole file.
    pub async fn respond_with_file(
        &self,
        path: impl AsRef<Path>,
        headers: Option<&HeaderMap>,
    ) -> Response<ResponseBody> {
        let path = path.as_ref();

        let metadata = match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return self.not_found(path),
        };
        let file_size = metadata.len();
        let modified = metadata.modified().ok();

        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                logger::log_warning(&format!("Failed to open file '{}': {e}", path.display()));
                return self.not_found(path);
            }
        };

        let content_type = match mime::content_type_for_extension(
            path.extension().and_then(|e| e.to_str()),
        ) {
            Some(content_type) => Some(content_type),
            None => match sniff_file(&mut file).await {
                Ok(content_type) => content_type,
                Err(e) => {
                    logger::log_warning(&format!("Failed to read file '{}': {e}", path.display()));
                    return self.not_found(path);
                }
            },
        };

        let mut body = FileBody::from_file(file, path.to_path_buf(), file_size, self.chunk_size);
        let mut response = self.factory.create_response(StatusCode::OK, "");
        {
            let response_headers = response.headers_mut();
            if let Some(modified) = modified {
                if let Ok(value) = HeaderValue::from_str(&format_http_date(modified)) {
                    response_headers.insert(LAST_MODIFIED, value);
                }
            }
            response_headers.insert(CONTENT_LENGTH, HeaderValue::from(file_size));
            if let Some(content_type) = content_type {
                response_headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            if self.serve_ranges {
                response_headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            }
        }

        let range_header = headers
            .filter(|_| self.serve_ranges)
            .filter(|h| if_range_allows(h, modified))
            .and_then(|h| h.get(RANGE))
            .and_then(|v| v.to_str().ok());

        match parse_range_header(range_header, file_size) {
            RangeParseResult::Valid(range) => {
                if let Err(e) = body.constrain(range.start, range.end).await {
                    logger::log_warning(&format!("Failed to seek file '{}': {e}", path.display()));
                    return self.not_found(path);
                }
                *response.status_mut() = StatusCode::PARTIAL_CONTENT;
                insert_header(&mut response, CONTENT_RANGE, &range.content_range(file_size));
                response
                    .headers_mut()
                    .insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
                self.log_access(path, StatusCode::PARTIAL_CONTENT, range.len());
            }
            RangeParseResult::NotSatisfiable => {
                logger::log_range_rejected(path, range_header.unwrap_or_default(), file_size);
                self.log_access(path, StatusCode::RANGE_NOT_SATISFIABLE, 0);
                return build_416_response(&self.factory, file_size);
            }
            RangeParseResult::None => {
                self.log_access(path, StatusCode::OK, file_size);
            }
        }

        *response.body_mut() = ResponseBody::File(body);
        response
    }

    fn not_found(&self, path: &Path) -> Response<ResponseBody> {
        self.log_access(path, StatusCode::NOT_FOUND, 0);
        build_404_response(&self.factory)
    }

    fn log_access(&self, path: &Path, status: StatusCode, bytes: u64) {
        if self.access_log {
            logger::log_file_response(path, status.as_u16(), bytes);
        }
    }
}

/// Sniff the leading bytes and rewind to the start of the file
async fn sniff_file(file: &mut File) -> std::io::Result<Option<&'static str>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut *file).take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
    file.seek(SeekFrom::Start(0)).await?;
    Ok(mime::sniff_content_type(&head))
}

/// Whether the `Range` header applies given the request's `If-Range`
///
/// No entity tags are issued, so only an HTTP-date equal to the
/// modification time lets the range through.
fn if_range_allows(headers: &HeaderMap, modified: Option<SystemTime>) -> bool {
    let Some(if_range) = headers.get(IF_RANGE) else {
        return true;
    };
    match (if_range.to_str(), modified) {
        (Ok(value), Some(modified)) => http_date_matches(value, modified),
        _ => false,
    }
}
