//! Uploaded file normalisation
//!
//! Transport-level upload descriptors stop here: the domain only ever sees
//! the path of a stored upload or an absent marker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::value::{InputMap, InputValue};
use crate::logger;

/// Transfer status reported for an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Ok,
    /// Exceeds the server-wide size limit
    IniSize,
    /// Exceeds the size limit declared by the form
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    /// Stopped by a server extension
    Extension,
}

impl UploadStatus {
    /// Conventional numeric status code
    pub const fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::IniSize => 1,
            Self::FormSize => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::CantWrite => 7,
            Self::Extension => 8,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => return None,
        })
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// One uploaded file as received from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    status: UploadStatus,
    stream_path: Option<PathBuf>,
    size: Option<u64>,
    client_filename: Option<String>,
    client_media_type: Option<String>,
}

impl UploadedFile {
    /// A completed upload stored at `path`
    pub fn stored(path: impl Into<PathBuf>) -> Self {
        Self {
            status: UploadStatus::Ok,
            stream_path: Some(path.into()),
            size: None,
            client_filename: None,
            client_media_type: None,
        }
    }

    /// An upload that did not complete
    pub const fn failed(status: UploadStatus) -> Self {
        Self {
            status,
            stream_path: None,
            size: None,
            client_filename: None,
            client_media_type: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_client_filename(mut self, name: impl Into<String>) -> Self {
        self.client_filename = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_client_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.client_media_type = Some(media_type.into());
        self
    }

    pub const fn status(&self) -> UploadStatus {
        self.status
    }

    /// Where the backing stream lives on disk
    pub fn stream_path(&self) -> Option<&Path> {
        self.stream_path.as_deref()
    }

    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }
}

/// Upload tree mirroring the shape of the submitted form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadedFiles {
    File(UploadedFile),
    Nested(BTreeMap<String, UploadedFiles>),
}

impl From<UploadedFile> for UploadedFiles {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

impl<K: Into<String>> FromIterator<(K, Self)> for UploadedFiles {
    fn from_iter<I: IntoIterator<Item = (K, Self)>>(iter: I) -> Self {
        Self::Nested(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Replace every upload with its stored path, or `Null` when it failed
pub fn normalize_uploads(files: &BTreeMap<String, UploadedFiles>) -> InputMap {
    files
        .iter()
        .map(|(key, upload)| (key.clone(), normalize_tree(upload)))
        .collect()
}

fn normalize_tree(upload: &UploadedFiles) -> InputValue {
    match upload {
        UploadedFiles::Nested(children) => InputValue::Map(normalize_uploads(children)),
        UploadedFiles::File(file) => normalize_file(file),
    }
}

fn normalize_file(file: &UploadedFile) -> InputValue {
    if !file.status.is_ok() {
        return InputValue::Null;
    }

    match file.stream_path() {
        Some(path) => InputValue::File(path.to_path_buf()),
        None => {
            logger::log_warning(&format!(
                "Upload '{}' reported success without a stored stream",
                file.client_filename().unwrap_or("<unnamed>")
            ));
            InputValue::Null
        }
    }
}
