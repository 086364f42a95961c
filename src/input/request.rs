//! Server-side request snapshot
//!
//! Wraps the request head together with the decoded input sources the
//! collapser reads: query, parsed body, uploads, cookies and attributes.

use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use hyper::http::request::Parts;
use hyper::{Method, Request, Uri};
use std::collections::BTreeMap;

use super::upload::UploadedFiles;
use super::value::{InputMap, InputValue};
use crate::error::{Error, Result};
use crate::logger;

/// Deepest bracket nesting accepted in a form key; deeper keys are dropped
pub const MAX_NESTING_LEVEL: usize = 64;

/// Attributes a router or middleware stores in the request extensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestAttributes(pub InputMap);

#[derive(Debug, Clone, Default)]
pub struct ServerRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query_params: InputMap,
    parsed_body: InputMap,
    uploaded_files: BTreeMap<String, UploadedFiles>,
    cookie_params: InputMap,
    attributes: InputMap,
}

impl ServerRequest {
    /// Request with the query string of `uri` already decoded
    pub fn new(method: Method, uri: Uri) -> Self {
        let query_params = uri.query().map(decode_form).unwrap_or_default();
        Self {
            method,
            uri,
            query_params,
            ..Self::default()
        }
    }

    /// Snapshot a hyper request head: query, cookies and [`RequestAttributes`]
    pub fn from_parts(parts: &Parts) -> Self {
        let mut request = Self::new(parts.method.clone(), parts.uri.clone());
        request.headers = parts.headers.clone();
        request.cookie_params = parse_cookies(&request.headers);
        if let Some(RequestAttributes(attributes)) = parts.extensions.get::<RequestAttributes>() {
            request.attributes = attributes.clone();
        }
        request
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        let mut snapshot = Self::new(request.method().clone(), request.uri().clone());
        snapshot.headers = request.headers().clone();
        snapshot.cookie_params = parse_cookies(&snapshot.headers);
        if let Some(RequestAttributes(attributes)) = request.extensions().get::<RequestAttributes>()
        {
            snapshot.attributes = attributes.clone();
        }
        snapshot
    }

    /// Append a header; a `Cookie` header re-derives the cookie params
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        let is_cookie = name == COOKIE;
        self.headers.append(name, value);
        if is_cookie {
            self.cookie_params = parse_cookies(&self.headers);
        }
        self
    }

    #[must_use]
    pub fn with_query_params(mut self, query: InputMap) -> Self {
        self.query_params = query;
        self
    }

    #[must_use]
    pub fn with_parsed_body(mut self, body: InputMap) -> Self {
        self.parsed_body = body;
        self
    }

    #[must_use]
    pub fn with_uploaded_files(mut self, files: BTreeMap<String, UploadedFiles>) -> Self {
        self.uploaded_files = files;
        self
    }

    #[must_use]
    pub fn with_cookie_params(mut self, cookies: InputMap) -> Self {
        self.cookie_params = cookies;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn without_attribute(mut self, name: &str) -> Self {
        self.attributes.remove(name);
        self
    }

    /// Decode a raw body according to `Content-Type`
    ///
    /// `application/x-www-form-urlencoded` and JSON (`application/json`,
    /// `*+json`) bodies are parsed; a JSON body must be an object. Any other
    /// media type leaves the parsed body empty.
    pub fn with_body_bytes(mut self, body: &[u8]) -> Result<Self> {
        let media_type = self
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());

        self.parsed_body = match media_type.as_deref() {
            Some("application/x-www-form-urlencoded") => {
                let text = std::str::from_utf8(body)
                    .map_err(|e| Error::Form(format!("form body is not UTF-8: {e}")))?;
                decode_form(text)
            }
            Some(m) if m == "application/json" || m.ends_with("+json") => decode_json(body)?,
            _ => InputMap::new(),
        };
        Ok(self)
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn query_params(&self) -> &InputMap {
        &self.query_params
    }

    pub const fn parsed_body(&self) -> &InputMap {
        &self.parsed_body
    }

    pub const fn uploaded_files(&self) -> &BTreeMap<String, UploadedFiles> {
        &self.uploaded_files
    }

    pub const fn cookie_params(&self) -> &InputMap {
        &self.cookie_params
    }

    pub const fn attributes(&self) -> &InputMap {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&InputValue> {
        self.attributes.get(name)
    }
}

/// Decode `a=1&b[c]=2&d[]=3` style pairs into a nested map
pub fn decode_form(input: &str) -> InputMap {
    let mut map = InputMap::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        let (base, segments) = split_key(&key);
        if segments.len() > MAX_NESTING_LEVEL {
            logger::log_warning(&format!(
                "Dropping form field '{base}': nesting exceeds {MAX_NESTING_LEVEL} levels"
            ));
            continue;
        }
        insert_path(&mut map, base.to_string(), &segments, InputValue::Text(value.into_owned()));
    }
    map
}

fn decode_json(body: &[u8]) -> Result<InputMap> {
    match serde_json::from_slice::<serde_json::Value>(body)? {
        serde_json::Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(key, value)| (key, InputValue::from(value)))
            .collect()),
        _ => Err(Error::Form("JSON body must be an object".to_string())),
    }
}

/// Split `a[b][]` into `("a", ["b", ""])`; keys without brackets stay whole
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    if open == 0 {
        return (key, Vec::new());
    }

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }

    if segments.is_empty() {
        return (key, segments);
    }
    (&key[..open], segments)
}

fn insert_path(map: &mut InputMap, key: String, segments: &[&str], value: InputValue) {
    let Some((next, rest)) = segments.split_first() else {
        map.insert(key, value);
        return;
    };

    let key_name = key.clone();
    let entry = map.entry(key).or_insert_with(|| InputValue::Map(InputMap::new()));
    if !matches!(entry, InputValue::Map(_)) {
        *entry = InputValue::Map(InputMap::new());
    }
    if let InputValue::Map(child) = entry {
        let child_key = if next.is_empty() {
            let Some(index) = next_index(child) else {
                logger::log_warning(&format!("Dropping form field '{key_name}': no free index"));
                return;
            };
            index
        } else {
            (*next).to_string()
        };
        insert_path(child, child_key, rest, value);
    }
}

/// One past the largest numeric key, for `a[]=` appends
///
/// `None` when the largest key is already `u64::MAX`.
fn next_index(map: &InputMap) -> Option<String> {
    let next = match map.keys().filter_map(|k| k.parse::<u64>().ok()).max() {
        Some(max) => max.checked_add(1)?,
        None => 0,
    };
    Some(next.to_string())
}

/// Parse every `Cookie` header; the first occurrence of a name wins
pub fn parse_cookies(headers: &HeaderMap) -> InputMap {
    let mut cookies = InputMap::new();
    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            cookies
                .entry(name.to_string())
                .or_insert_with(|| InputValue::from(value));
        }
    }
    cookies
}
