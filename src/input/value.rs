//! Input values handed to the domain layer
//!
//! Request data is modelled as an associative tree: lists become maps keyed
//! `"0"`, `"1"`, ... and uploaded files become plain paths.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub type InputMap = BTreeMap<String, InputValue>;

/// One value in a request snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Absent marker, e.g. a failed upload or JSON `null`
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    /// Filesystem path of a successfully uploaded file
    File(PathBuf),
    Map(InputMap),
}

impl InputValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::File(p) => Some(p),
            _ => None,
        }
    }

    pub const fn as_map(&self) -> Option<&InputMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a nested value, e.g. `get(&["qix", "bar"])`
    pub fn get(&self, path: &[&str]) -> Option<&Self> {
        path.iter().try_fold(self, |value, key| value.as_map()?.get(*key))
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<PathBuf> for InputValue {
    fn from(value: PathBuf) -> Self {
        Self::File(value)
    }
}

impl From<InputMap> for InputValue {
    fn from(value: InputMap) -> Self {
        Self::Map(value)
    }
}

impl From<serde_json::Value> for InputValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Map(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), Self::from(v)))
                    .collect(),
            ),
            Value::Object(fields) => {
                Self::Map(fields.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
