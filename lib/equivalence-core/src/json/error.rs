use std::fmt;

use serde_json::Value;

/// The type tag of a JSON value, used when reporting traversal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonKind {
    /// `null`
    #[display("null")]
    Null,
    /// `true` or `false`
    #[display("boolean")]
    Bool,
    /// Any JSON number.
    #[display("number")]
    Number,
    /// A JSON string.
    #[display("string")]
    String,
    /// A JSON object.
    #[display("object")]
    Object,
    /// A JSON array.
    #[display("array")]
    Array,
}

impl JsonKind {
    /// Returns the kind of the given value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
        }
    }
}

/// The concrete keys and indices walked from the document root.
///
/// Wildcards are recorded with the key or index they actually matched, so the
/// location always points at a single node of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location(Vec<String>);

impl Location {
    /// The document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// The segments walked so far.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub(super) fn push(&mut self, segment: impl fmt::Display) {
        self.0.push(segment.to_string());
    }

    pub(super) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

/// Errors raised while stripping a single [`Field`](super::Field) from a document.
///
/// Missing keys and `null` values are never errors: a field that addresses
/// data absent from a document simply has no effect on it.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum StripError {
    /// A literal array index falls outside `[0, len)`.
    #[display("index {index} out of bounds for array of length {len} at '{at}'")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the array.
        len: usize,
        /// Where the array was found.
        at: Location,
    },

    /// A step expected an object or an array but found a scalar.
    #[display("cannot select '{segment}' from a {kind} value at '{at}'")]
    UnsupportedType {
        /// The kind of value found.
        kind: JsonKind,
        /// The step that could not be applied.
        segment: String,
        /// Where the value was found.
        at: Location,
    },

    /// A literal step used against an array is not a non-negative integer.
    #[display("must specify an integer when referencing json arrays, got '{segment}' at '{at}'")]
    MalformedIndex {
        /// The offending segment.
        segment: String,
        /// Where the array was found.
        at: Location,
    },
}

/// A [`StripError`] tagged with the field that raised it.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("failed to strip field '{field}': {source}")]
pub struct FieldError {
    /// The dotted form of the failing field.
    pub field: String,
    /// The underlying failure.
    pub source: StripError,
}
