//! Files produced by a test run and stored as golden files.

use serde_json::Value;

use crate::json::{Field, FieldError, strip_fields};

/// The content of one output file.
///
/// JSON files are decoded so that fields can be stripped before comparison;
/// anything else is kept as text.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum File {
    /// Plain text, compared verbatim.
    Raw(String),
    /// A decoded JSON document.
    Json(Value),
}

impl File {
    /// Builds a file from bytes read from disk, decoding names ending in `.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if a `.json` file does not hold valid JSON.
    pub fn new(name: &str, raw: &[u8]) -> Result<Self, serde_json::Error> {
        if name.ends_with(".json") {
            serde_json::from_slice(raw).map(Self::Json)
        } else {
            Ok(Self::Raw(String::from_utf8_lossy(raw).into_owned()))
        }
    }

    /// Decodes a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::Json)
    }

    /// Collects a stream of JSON lines into one JSON array, skipping blank lines.
    ///
    /// # Errors
    ///
    /// Returns an error if any non-blank line is not valid JSON.
    pub fn from_json_lines(text: &str) -> Result<Self, serde_json::Error> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<Value>, _>>()
            .map(|lines| Self::Json(Value::Array(lines)))
    }

    /// Removes `fields` from a JSON file; raw files are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first field that cannot be applied to the document.
    pub fn strip(self, fields: &[Field]) -> Result<Self, FieldError> {
        match self {
            Self::Json(value) => strip_fields(fields, value).map(Self::Json),
            raw @ Self::Raw(_) => Ok(raw),
        }
    }

    /// Returns true for decoded JSON files.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// The text stored in a golden file.
    ///
    /// JSON is pretty-printed with sorted keys and a trailing newline. Keys are
    /// sorted only while `serde_json`'s `preserve_order` feature stays off.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON value cannot be serialized.
    pub fn to_golden_string(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Raw(text) => Ok(text.clone()),
            Self::Json(value) => {
                let mut text = serde_json::to_string_pretty(value)?;
                text.push('\n');
                Ok(text)
            }
        }
    }
}
