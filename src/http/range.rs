//! HTTP Range request parsing module
//!
//! Single-range `bytes` parsing per RFC 7233. Multiple ranges are not served.

/// Parsed, validated byte window (both ends inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Start byte position
    pub start: u64,
    /// End byte position, always `< file_size`
    pub end: u64,
}

#[allow(clippy::len_without_is_empty)]
impl ByteRange {
    /// Number of bytes in the window
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a 206 response
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// `Content-Range` value for a 416 response
pub fn unsatisfied_content_range(file_size: u64) -> String {
    format!("bytes */{file_size}")
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(ByteRange),
    /// Well-formed but outside the file - should return 416
    NotSatisfiable,
    /// No Range header, other unit, multi-range or malformed (ignore, return full content)
    None,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// A range is satisfiable only when `start <= end < file_size`. An end past
/// the file is rejected rather than clamped, and so is a suffix longer than
/// the file.
///
/// # Examples
/// ```
/// use http_marshal::http::range::{parse_range_header, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert!(matches!(result, RangeParseResult::Valid(_)));
///
/// let result = parse_range_header(None, 1000);
/// assert!(matches!(result, RangeParseResult::None));
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(ranges) = strip_bytes_unit(header.trim()) else {
        return RangeParseResult::None; // Not bytes unit, ignore
    };

    // Only support single range (not multi-range)
    if ranges.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix range: "-500" means last 500 bytes
    if start_str.is_empty() {
        return parse_suffix_range(end_str, file_size);
    }

    parse_standard_range(start_str, end_str, file_size)
}

/// Strip a case-insensitive `bytes=` prefix
fn strip_bytes_unit(header: &str) -> Option<&str> {
    let (unit, ranges) = header.split_once('=')?;
    unit.trim().eq_ignore_ascii_case("bytes").then_some(ranges)
}

/// Digits only; `str::parse` would also accept a leading `+`
fn parse_position(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, file_size: u64) -> RangeParseResult {
    let Some(suffix) = parse_position(suffix_str) else {
        return RangeParseResult::None;
    };

    // start = size - suffix; a negative start or an empty window cannot be served
    match (file_size.checked_sub(suffix), file_size.checked_sub(1)) {
        (Some(start), Some(end)) if start <= end => {
            RangeParseResult::Valid(ByteRange { start, end })
        }
        _ => RangeParseResult::NotSatisfiable,
    }
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: u64) -> RangeParseResult {
    let Some(start) = parse_position(start_str) else {
        return RangeParseResult::None;
    };

    let end = if end_str.is_empty() {
        // Open-ended: an empty file has no last byte
        let Some(last) = file_size.checked_sub(1) else {
            return RangeParseResult::NotSatisfiable;
        };
        last
    } else {
        let Some(e) = parse_position(end_str) else {
            return RangeParseResult::None;
        };
        e
    };

    if start > end || end >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(header: &str, size: u64) -> ByteRange {
        match parse_range_header(Some(header), size) {
            RangeParseResult::Valid(r) => r,
            other => panic!("Expected Valid for {header:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range_header(None, 100), RangeParseResult::None);
    }

    #[test]
    fn test_standard_range() {
        let r = valid("bytes=0-9", 100);
        assert_eq!((r.start, r.end), (0, 9));
        assert_eq!(r.len(), 10);
        assert_eq!(r.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_range() {
        let r = valid("bytes=50-", 100);
        assert_eq!((r.start, r.end), (50, 99));
        assert_eq!(r.len(), 50);
    }

    #[test]
    fn test_suffix_range() {
        let r = valid("bytes=-20", 100);
        assert_eq!((r.start, r.end), (80, 99));
        let whole = valid("bytes=-100", 100);
        assert_eq!((whole.start, whole.end), (0, 99));
    }

    #[test]
    fn test_single_byte_windows() {
        let first = valid("bytes=0-0", 100);
        assert_eq!(first.len(), 1);
        let last = valid("bytes=99-99", 100);
        assert_eq!(last.len(), 1);
    }

    #[test]
    fn test_unit_and_whitespace_tolerance() {
        let r = valid(" Bytes = 10 - 19 ", 100);
        assert_eq!((r.start, r.end), (10, 19));
    }

    #[test]
    fn test_not_satisfiable() {
        for header in [
            "bytes=200-",
            "bytes=100-",
            "bytes=50-100",
            "bytes=9-1",
            "bytes=-0",
            "bytes=-101",
        ] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::NotSatisfiable,
                "{header}"
            );
        }
    }

    #[test]
    fn test_empty_file() {
        for header in ["bytes=0-", "bytes=0-0", "bytes=-1"] {
            assert_eq!(
                parse_range_header(Some(header), 0),
                RangeParseResult::NotSatisfiable,
                "{header}"
            );
        }
    }

    #[test]
    fn test_invalid_format() {
        for header in [
            "bytes=a-b",
            "bytes=0-9,20-29",
            "bytes=-",
            "bytes=5",
            "bytes=+1-2",
            "bytes=1-2-3",
            "items=0-9",
            "0-9",
        ] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::None,
                "{header}"
            );
        }
    }

    #[test]
    fn test_unsatisfied_content_range() {
        assert_eq!(unsatisfied_content_range(42), "bytes */42");
    }
}
