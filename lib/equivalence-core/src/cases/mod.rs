//! Test cases: reading them from disk, running them, and comparing or
//! recording their outputs against golden files.
//!
//! A tests directory holds one sub-directory per test case. Each case holds a
//! Terraform configuration and an optional [`spec.json`](Specification).
//! Golden files live in `<goldens>/<case name>/<file name>`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use equivalence_core::cases::TestCase;
//! use equivalence_core::terraform::TerraformBinary;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let terraform = TerraformBinary::new("terraform")?;
//!
//! for case in TestCase::read_all(Path::new("tests"))? {
//!     let output = case.run_with(&terraform)?;
//!     for (file, diff) in output.compute_diff(Path::new("goldens"))? {
//!         println!("{file}: {diff}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::diff::FileDiff;
use crate::files::File;
use crate::terraform::{Outputs, Terraform};

mod error;
mod specification;

pub use self::error::CaseError;
pub use self::specification::{
    DEFAULT_IGNORED_FIELDS, FieldEntry, SPECIFICATION_FILE, Specification, StepEntry,
};

/// A single equivalence test case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// The name of the case, which is the name of its directory.
    pub name: String,
    /// The directory holding the Terraform configuration.
    pub directory: PathBuf,
    /// The content of the case's `spec.json`.
    pub specification: Specification,
}

impl TestCase {
    /// Reads one test case from its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the specification file cannot be read or decoded.
    pub fn read(directory: impl Into<PathBuf>) -> Result<Self, CaseError> {
        let directory = directory.into();
        let name = directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let specification = Specification::read(&directory)?;

        Ok(Self {
            name,
            directory,
            specification,
        })
    }

    /// Reads every test case in `directory`, sorted by name.
    ///
    /// Every sub-directory is a test case; plain files are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `directory` is not a readable directory, or if any
    /// test case has an invalid specification.
    pub fn read_all(directory: &Path) -> Result<Vec<Self>, CaseError> {
        if !directory.is_dir() {
            return Err(CaseError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }

        let mut directories = fs::read_dir(directory)
            .map_err(CaseError::io(directory))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, io::Error>>()
            .map_err(CaseError::io(directory))?;
        directories.retain(|path| path.is_dir());
        directories.sort();

        let cases = directories
            .into_iter()
            .map(Self::read)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = cases.len(), directory = %directory.display(), "test cases found");
        Ok(cases)
    }

    /// Runs this test case and strips the configured fields from its outputs.
    ///
    /// # Errors
    ///
    /// Returns an error if Terraform fails, or if a configured field cannot be
    /// applied to its output file.
    pub fn run_with(&self, terraform: &dyn Terraform) -> Result<TestOutput, CaseError> {
        info!(case = %self.name, version = terraform.version(), "running test case");
        let outputs =
            terraform.execute_test(&self.directory, &self.specification.include_files)?;

        for file in self.specification.ignore_fields.keys() {
            if !outputs.contains_key(file) {
                warn!(case = %self.name, %file, "ignored fields configured for a file that was not produced");
            }
        }

        let files = outputs
            .into_iter()
            .map(|(file, content)| {
                let fields = self.specification.fields_for(&file);
                if !content.is_json() && self.specification.ignore_fields.contains_key(&file) {
                    warn!(case = %self.name, %file, "ignored fields configured for a file that is not JSON");
                }
                match content.strip(&fields) {
                    Ok(content) => Ok((file, content)),
                    Err(source) => Err(CaseError::Strip {
                        case: self.name.clone(),
                        file,
                        source,
                    }),
                }
            })
            .collect::<Result<Outputs, _>>()?;

        Ok(TestOutput {
            name: self.name.clone(),
            files,
        })
    }
}

/// The stripped outputs of a test case run.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutput {
    /// The name of the test case.
    pub name: String,
    /// The output files, keyed by name.
    pub files: Outputs,
}

impl TestOutput {
    /// The directory holding this case's golden files.
    #[must_use]
    pub fn golden_directory(&self, goldens: &Path) -> PathBuf {
        goldens.join(&self.name)
    }

    /// Compares every output file against its golden file.
    ///
    /// # Errors
    ///
    /// Returns an error if a golden file exists but cannot be read, or if an
    /// output file cannot be rendered.
    pub fn compute_diff(&self, goldens: &Path) -> Result<IndexMap<String, FileDiff>, CaseError> {
        let directory = self.golden_directory(goldens);

        self.files
            .iter()
            .map(|(file, content)| {
                let actual = self.render(file, content)?;
                let path = directory.join(file);
                let golden = match fs::read_to_string(&path) {
                    Ok(golden) => Some(golden),
                    Err(error) if error.kind() == io::ErrorKind::NotFound => None,
                    Err(source) => return Err(CaseError::Io { path, source }),
                };
                let diff = FileDiff::compute(file, golden.as_deref(), &actual);
                Ok((file.clone(), diff))
            })
            .collect()
    }

    /// Replaces this case's golden files with the current outputs.
    ///
    /// Golden files left over from previous runs are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the golden directory cannot be recreated or a file
    /// cannot be written.
    pub fn update_golden_files(&self, goldens: &Path) -> Result<(), CaseError> {
        let directory = self.golden_directory(goldens);
        if directory.exists() {
            fs::remove_dir_all(&directory).map_err(CaseError::io(&directory))?;
        }
        fs::create_dir_all(&directory).map_err(CaseError::io(&directory))?;

        for (file, content) in &self.files {
            let text = self.render(file, content)?;
            let path = directory.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(CaseError::io(parent))?;
            }
            fs::write(&path, text).map_err(CaseError::io(&path))?;
            debug!(case = %self.name, path = %path.display(), "golden file written");
        }
        Ok(())
    }

    fn render(&self, file: &str, content: &File) -> Result<String, CaseError> {
        content
            .to_golden_string()
            .map_err(|source| CaseError::Render {
                case: self.name.clone(),
                file: file.to_string(),
                source,
            })
    }
}
