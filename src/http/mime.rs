//! MIME type detection module
//!
//! Content-Type is looked up by file extension first, then sniffed from the
//! leading bytes. Undetermined types yield `None` so the header is omitted.

/// Bytes read from the head of a file for sniffing
pub const SNIFF_LEN: usize = 512;

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use http_marshal::http::mime::content_type_for_extension;
/// assert_eq!(content_type_for_extension(Some("html")), Some("text/html; charset=utf-8"));
/// assert_eq!(content_type_for_extension(Some("MP4")), Some("video/mp4"));
/// assert_eq!(content_type_for_extension(None), None);
/// ```
pub fn content_type_for_extension(extension: Option<&str>) -> Option<&'static str> {
    let ext = extension?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(content_type)
}

/// Guess Content-Type from the leading bytes of a file
///
/// Recognises common binary signatures, markup prologues and plain UTF-8
/// text. Empty input is undetermined.
pub fn sniff_content_type(head: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"\0asm", "application/wasm"),
    ];

    if head.is_empty() {
        return None;
    }

    if let Some(&(_, content_type)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return Some(content_type);
    }

    if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    let text = trim_leading_whitespace(head);
    if starts_with_ignore_case(text, b"<!doctype html") || starts_with_ignore_case(text, b"<html") {
        return Some("text/html; charset=utf-8");
    }
    if text.starts_with(b"<?xml") {
        return Some("application/xml");
    }

    if looks_like_text(head) {
        return Some("text/plain; charset=utf-8");
    }

    None
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &bytes[skip..]
}

fn starts_with_ignore_case(bytes: &[u8], prefix: &[u8]) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// UTF-8 without NUL bytes; a multi-byte sequence cut at the sniff boundary is allowed
fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && head.len() == SNIFF_LEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type_for_extension(Some("html")), Some("text/html; charset=utf-8"));
        assert_eq!(content_type_for_extension(Some("css")), Some("text/css"));
        assert_eq!(content_type_for_extension(Some("js")), Some("application/javascript"));
        assert_eq!(content_type_for_extension(Some("json")), Some("application/json"));
        assert_eq!(content_type_for_extension(Some("PNG")), Some("image/png"));
        assert_eq!(content_type_for_extension(Some("mp4")), Some("video/mp4"));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for_extension(Some("xyz")), None);
        assert_eq!(content_type_for_extension(None), None);
    }

    #[test]
    fn test_sniff_binary_signatures() {
        assert_eq!(sniff_content_type(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), Some("image/png"));
        assert_eq!(sniff_content_type(b"\xff\xd8\xff\xe0\0\x10JFIF"), Some("image/jpeg"));
        assert_eq!(sniff_content_type(b"%PDF-1.7\n"), Some("application/pdf"));
        assert_eq!(sniff_content_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
    }

    #[test]
    fn test_sniff_markup_and_text() {
        assert_eq!(
            sniff_content_type(b"  <!DOCTYPE html><html></html>"),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(sniff_content_type(b"<?xml version=\"1.0\"?>"), Some("application/xml"));
        assert_eq!(sniff_content_type("héllo".as_bytes()), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_sniff_undetermined() {
        assert_eq!(sniff_content_type(b""), None);
        assert_eq!(sniff_content_type(b"\x00\x01\x02\x03"), None);
        assert_eq!(sniff_content_type(b"\xfe\xfa\xfb"), None);
    }
}
