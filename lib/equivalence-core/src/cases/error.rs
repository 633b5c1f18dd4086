use std::io;
use std::path::PathBuf;

use crate::json::FieldError;
use crate::terraform::TerraformError;

/// Errors raised while reading, running or recording test cases.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum CaseError {
    /// Running Terraform failed.
    Terraform(TerraformError),

    /// A file or directory could not be read or written.
    #[display("I/O error on '{}': {source}", path.display())]
    #[from(skip)]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The tests directory is missing or is not a directory.
    #[display("'{}' is not a directory", path.display())]
    #[from(skip)]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// A `spec.json` file could not be decoded.
    #[display("invalid specification '{}' at '{location}': {source}", path.display())]
    #[from(skip)]
    InvalidSpecification {
        /// The specification file.
        path: PathBuf,
        /// The JSON path of the offending entry.
        location: String,
        /// The decoding error.
        source: serde_json::Error,
    },

    /// The fields of a specification could not be applied to an output file.
    /// An include file name is absolute or leaves the case directory.
    #[display("invalid include file '{name}' in '{}': names must be relative and stay inside the test case", path.display())]
    #[from(skip)]
    InvalidIncludeFile {
        /// The specification file.
        path: PathBuf,
        /// The offending name.
        name: String,
    },

    #[display("could not strip '{file}' of test case '{case}': {source}")]
    #[from(skip)]
    Strip {
        /// The test case name.
        case: String,
        /// The output file name.
        file: String,
        /// The failing field.
        source: FieldError,
    },

    /// An output file could not be rendered for its golden file.
    #[display("could not render '{file}' of test case '{case}': {source}")]
    #[from(skip)]
    Render {
        /// The test case name.
        case: String,
        /// The output file name.
        file: String,
        /// The serialization error.
        source: serde_json::Error,
    },
}

impl CaseError {
    pub(super) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
