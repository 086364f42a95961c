//! HTTP-date helpers (RFC 7231 section 7.1.1.1)

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete formats recipients still have to accept
const RFC850_DATE: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_DATE: &str = "%a %b %e %H:%M:%S %Y";

/// Format a timestamp for `Last-Modified`, e.g. `Tue, 15 Nov 1994 08:12:31 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP-date into UTC
///
/// Accepts IMF-fixdate (and any RFC 2822 date), RFC 850 and asctime.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    [RFC850_DATE, ASCTIME_DATE]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.and_utc())
}

/// Whether `value` names exactly the same second as `time`
pub fn http_date_matches(value: &str, time: SystemTime) -> bool {
    let expected = DateTime::<Utc>::from(time).timestamp();
    parse_http_date(value).is_some_and(|dt| dt.timestamp() == expected)
}
