use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The segment that selects every key of an object or every element of an array.
pub const WILDCARD: &str = "*";

/// What a [`Step`] selects inside the container it meets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// An object key.
    ///
    /// Against an array, the key must parse as a non-negative integer.
    Key(String),
    /// An array index.
    ///
    /// Against an object, the decimal form of the index is used as the key.
    Index(usize),
    /// Every key of an object, or every element of an array.
    Wildcard,
}

impl Selector {
    /// Parses a single path segment.
    ///
    /// `*` is the wildcard, a canonical decimal integer (no sign, no leading
    /// zero) is an index, anything else is a key.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        if segment == WILDCARD {
            return Self::Wildcard;
        }
        match segment.parse::<usize>() {
            Ok(index) if index.to_string() == segment => Self::Index(index),
            _ => Self::Key(segment.to_string()),
        }
    }

    /// The key used when this selector meets an object.
    pub(super) fn object_key(&self) -> Cow<'_, str> {
        match self {
            Self::Key(key) => Cow::Borrowed(key),
            Self::Index(index) => Cow::Owned(index.to_string()),
            Self::Wildcard => Cow::Borrowed(WILDCARD),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
            Self::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// A side condition on a [`Step`].
///
/// The filter walks `path` inside a candidate value and is satisfied when the
/// value found there equals `value`. A walk that cannot proceed (missing key,
/// index out of range, scalar with segments left) is simply unsatisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Keys and indices to walk from the candidate.
    #[serde(default)]
    pub path: Vec<String>,
    /// The literal the value at `path` must equal.
    pub value: Value,
}

impl Filter {
    /// Creates a filter matching `value` at `path`.
    pub fn new<I, S>(path: I, value: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            value: value.into(),
        }
    }

    /// Returns true when the value at this filter's path inside `candidate`
    /// equals its target.
    #[must_use]
    pub fn evaluate(&self, candidate: &Value) -> bool {
        matches_at(&self.path, &self.value, candidate)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.path.join("."), self.value)
    }
}

fn matches_at(path: &[String], target: &Value, current: &Value) -> bool {
    let Some((segment, rest)) = path.split_first() else {
        return literal_eq(current, target);
    };

    match current {
        Value::Object(map) => map
            .get(segment)
            .is_some_and(|next| matches_at(rest, target, next)),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .is_some_and(|next| matches_at(rest, target, next)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

// Numbers compare by value so that `1` matches `1.0`.
#[allow(clippy::float_cmp)]
fn literal_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => {
            left == right
                || left
                    .as_f64()
                    .zip(right.as_f64())
                    .is_some_and(|(left, right)| left == right)
        }
        _ => left == right,
    }
}

/// One segment of a [`Field`]: a selector plus optional filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    selector: Selector,
    filters: Vec<Filter>,
}

impl Step {
    /// Creates an unfiltered step.
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            filters: Vec::new(),
        }
    }

    /// An unfiltered step selecting `key`, even if it looks like an index or a wildcard.
    pub fn key(key: impl Into<String>) -> Self {
        Self::new(Selector::Key(key.into()))
    }

    /// An unfiltered step selecting `index`.
    #[must_use]
    pub fn index(index: usize) -> Self {
        Self::new(Selector::Index(index))
    }

    /// An unfiltered wildcard step.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::new(Selector::Wildcard)
    }

    /// Adds a filter; all filters of a step must hold for it to apply.
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// The selector of this step.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The filters of this step.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns true when every filter of this step holds for `candidate`.
    ///
    /// An unfiltered step applies to everything. A step that does not apply
    /// leaves the candidate untouched: it is neither removed nor descended into.
    #[must_use]
    pub fn applies_to(&self, candidate: &Value) -> bool {
        self.filters.iter().all(|filter| filter.evaluate(candidate))
    }
}

impl From<Selector> for Step {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)?;
        for filter in &self.filters {
            write!(f, "[{filter}]")?;
        }
        Ok(())
    }
}

/// A downward path from the document root, addressing the nodes to remove.
///
/// # Example
///
/// ```rust
/// use equivalence_core::json::{Field, Selector};
///
/// let field = Field::parse("list.*.tags.0");
/// assert_eq!(field.steps().len(), 4);
/// assert_eq!(field.steps()[1].selector(), &Selector::Wildcard);
/// assert_eq!(field.steps()[3].selector(), &Selector::Index(0));
/// assert_eq!(field.to_string(), "list.*.tags.0");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    steps: Vec<Step>,
}

impl Field {
    /// Builds a field from explicit steps, for filters or literal `*` keys.
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Splits a dotted path into unfiltered steps.
    ///
    /// Parsing never fails: whether a segment is used as a key or an index is
    /// decided by the container met during traversal.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let steps = path
            .split('.')
            .map(|segment| Step::new(Selector::parse(segment)))
            .collect();
        Self { steps }
    }

    /// The steps of this field, root first.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl FromStr for Field {
    type Err = Infallible;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(path))
    }
}

impl From<&str> for Field {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<Vec<Step>> for Field {
    fn from(steps: Vec<Step>) -> Self {
        Self::new(steps)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, step) in self.steps.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
