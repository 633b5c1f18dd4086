//! Path-addressed removal of fields from JSON documents.
//!
//! A [`Field`] is a dotted path such as `values.root_module.resources.*.values.id`.
//! Each segment is a [`Step`]: an object key, an array index, or the `*`
//! wildcard, optionally guarded by [`Filter`]s.
//!
//! - The last step removes what it selects.
//! - Earlier steps descend into what they select.
//! - A step whose filters do not hold for a candidate leaves it untouched.
//!
//! # Example
//!
//! ```rust
//! use equivalence_core::json::{Field, Filter, Step, strip_fields};
//! use serde_json::json;
//!
//! let state = json!({
//!     "terraform_version": "1.9.0",
//!     "resources": [
//!         {"id": "i-123", "mode": "managed", "name": "web"},
//!         {"id": "ds-456", "mode": "data", "name": "ami"}
//!     ]
//! });
//!
//! let fields = [
//!     Field::parse("terraform_version"),
//!     Field::new(vec![
//!         Step::key("resources"),
//!         Step::wildcard().with_filter(Filter::new(["mode"], "managed")),
//!         Step::key("id"),
//!     ]),
//! ];
//!
//! let stripped = strip_fields(&fields, state).unwrap();
//!
//! assert_eq!(
//!     stripped,
//!     json!({
//!         "resources": [
//!             {"mode": "managed", "name": "web"},
//!             {"id": "ds-456", "mode": "data", "name": "ami"}
//!         ]
//!     })
//! );
//! ```

use serde_json::Value;
use tracing::debug;

mod error;
mod step;
mod strip;

pub use self::error::{FieldError, JsonKind, Location, StripError};
pub use self::step::{Field, Filter, Selector, Step, WILDCARD};
pub use self::strip::strip;

/// Strips every field from `value`, in order.
///
/// Each field sees the output of the previous one. An empty slice returns the
/// document unchanged.
///
/// # Errors
///
/// Returns the first [`StripError`], tagged with the field that raised it.
pub fn strip_fields(fields: &[Field], value: Value) -> Result<Value, FieldError> {
    fields.iter().try_fold(value, |value, field| {
        debug!(%field, "stripping field");
        strip(field, value).map_err(|source| FieldError {
            field: field.to_string(),
            source,
        })
    })
}
