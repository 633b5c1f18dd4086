//! # Equivalence Core
//!
//! Compare the outputs of Terraform runs against stored golden files.
//!
//! An equivalence test runs a Terraform configuration with `init`, `plan`,
//! `apply` and `show`. It strips the fields that legitimately differ between
//! runs, such as timestamps, versions and generated ids. The remaining
//! documents are then compared with golden files recorded by a previous run.
//!
//! The crate is split into:
//! - [`json`]: path-addressed field removal from JSON documents, the heart of
//!   the comparison
//! - [`cases`]: test case discovery, `spec.json` handling, golden file diffs
//!   and updates
//! - [`terraform`]: the [`Terraform`](terraform::Terraform) runner abstraction
//!   and its binary-backed implementation
//! - [`files`] and [`diff`]: output file content and comparison results
//!
//! ## Stripping fields
//!
//! ```rust
//! use equivalence_core::json::{Field, strip_fields};
//! use serde_json::json;
//!
//! let apply = json!([
//!     {"@level": "info", "@timestamp": "2024-01-01T10:00:00Z", "type": "version"},
//!     {"@level": "info", "@timestamp": "2024-01-01T10:00:01Z", "type": "apply_complete"}
//! ]);
//!
//! let stripped = strip_fields(&[Field::parse("*.@timestamp")], apply).unwrap();
//!
//! assert_eq!(
//!     stripped,
//!     json!([
//!         {"@level": "info", "type": "version"},
//!         {"@level": "info", "type": "apply_complete"}
//!     ])
//! );
//! ```
//!
//! ## Running test cases
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use equivalence_core::cases::TestCase;
//! use equivalence_core::terraform::TerraformBinary;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let terraform = TerraformBinary::new("terraform")?;
//! for case in TestCase::read_all(Path::new("tests"))? {
//!     case.run_with(&terraform)?
//!         .update_golden_files(Path::new("goldens"))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cases;
pub mod diff;
pub mod files;
pub mod json;
pub mod terraform;

pub use self::cases::{CaseError, TestCase, TestOutput};
pub use self::diff::FileDiff;
pub use self::files::File;
pub use self::json::{Field, Filter, Step, strip, strip_fields};
pub use self::terraform::{Terraform, TerraformBinary, TerraformError};
