//! Request input marshalling
//!
//! Collapses every input source of a [`ServerRequest`] into one
//! [`InputMap`] for the domain layer.

pub mod request;
pub mod upload;
pub mod value;

pub use request::{RequestAttributes, ServerRequest};
pub use upload::{normalize_uploads, UploadStatus, UploadedFile, UploadedFiles};
pub use value::{InputMap, InputValue};

/// Merge query params, parsed body, uploads, cookies and attributes
///
/// Sources are applied in that order and a later source replaces the whole
/// value of a key set by an earlier one; nested maps are not merged.
pub fn get_request_input(request: &ServerRequest) -> InputMap {
    let mut input = request.query_params().clone();
    input.extend(request.parsed_body().clone());
    input.extend(normalize_uploads(request.uploaded_files()));
    input.extend(request.cookie_params().clone());
    input.extend(request.attributes().clone());
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderValue, COOKIE};
    use hyper::{Method, Uri};
    use std::collections::BTreeMap;
    use std::path::Path;

    fn map(pairs: &[(&str, &str)]) -> InputMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), InputValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_attributes_win_over_query() {
        let request = ServerRequest::new(Method::GET, Uri::from_static("/?a=1"))
            .with_attribute("a", "2");
        let input = get_request_input(&request);
        assert_eq!(input["a"], InputValue::from("2"));
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn test_precedence_order() {
        let mut files = BTreeMap::new();
        files.insert(
            "upload".to_string(),
            UploadedFiles::from(UploadedFile::stored("/tmp/u1")),
        );
        files.insert(
            "cookie".to_string(),
            UploadedFiles::from(UploadedFile::stored("/tmp/u2")),
        );

        let request = ServerRequest::new(Method::POST, Uri::from_static("/"))
            .with_query_params(map(&[("query", "q"), ("body", "q"), ("upload", "q")]))
            .with_parsed_body(map(&[("body", "b"), ("upload", "b"), ("attr", "b")]))
            .with_uploaded_files(files)
            .with_header(COOKIE, HeaderValue::from_static("cookie=c; attr=c"))
            .with_attribute("attr", "a");

        let input = get_request_input(&request);
        assert_eq!(input["query"], InputValue::from("q"));
        assert_eq!(input["body"], InputValue::from("b"));
        assert_eq!(input["upload"].as_path(), Some(Path::new("/tmp/u1")));
        assert_eq!(input["cookie"], InputValue::from("c"));
        assert_eq!(input["attr"], InputValue::from("a"));
    }

    #[test]
    fn test_no_deep_merge() {
        let request = ServerRequest::new(Method::GET, Uri::from_static("/?f%5Ba%5D=1&f%5Bb%5D=2"))
            .with_parsed_body(
                [("f".to_string(), InputValue::Map(map(&[("c", "3")])))]
                    .into_iter()
                    .collect(),
            );
        let input = InputValue::Map(get_request_input(&request));
        assert_eq!(input.get(&["f", "c"]), Some(&InputValue::from("3")));
        assert!(input.get(&["f", "a"]).is_none());
    }

    #[test]
    fn test_uploads_mirror_form_shape() {
        let files: BTreeMap<String, UploadedFiles> = [
            ("foo".to_string(), UploadedFile::stored("/files/foo").into()),
            (
                "qix".to_string(),
                [
                    ("bar", UploadedFiles::from(UploadedFile::stored("/files/bar"))),
                    ("baz", UploadedFile::stored("/files/baz").into()),
                    ("bing", UploadedFile::failed(UploadStatus::NoFile).into()),
                ]
                .into_iter()
                .collect(),
            ),
        ]
        .into_iter()
        .collect();

        let request = ServerRequest::default()
            .with_uploaded_files(files)
            .with_attribute("attr", "attr");

        let mut qix = InputMap::new();
        qix.insert("bar".to_string(), InputValue::File("/files/bar".into()));
        qix.insert("baz".to_string(), InputValue::File("/files/baz".into()));
        qix.insert("bing".to_string(), InputValue::Null);
        let mut expected = InputMap::new();
        expected.insert("foo".to_string(), InputValue::File("/files/foo".into()));
        expected.insert("qix".to_string(), InputValue::Map(qix));
        expected.insert("attr".to_string(), InputValue::from("attr"));

        assert_eq!(get_request_input(&request), expected);
    }
}
