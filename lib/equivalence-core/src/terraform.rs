//! Execution of a single equivalence test with the Terraform binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::files::File;

/// Output files of a test run, in the order they were produced.
pub type Outputs = IndexMap<String, File>;

/// The saved plan file, passed between the plan, apply and show commands.
pub const PLAN_FILE: &str = "equivalence_test_plan";

/// Runs the Terraform commands of a single test case.
///
/// The runner is a trait so that the harness can be exercised without a real
/// Terraform binary.
pub trait Terraform {
    /// The version of the underlying Terraform binary.
    fn version(&self) -> &str;

    /// Runs `init`, `plan`, `apply` and `show` inside `directory`.
    ///
    /// Returns the raw plan output (`plan`), the apply JSON lines
    /// (`apply.json`), the state (`state.json`), the plan (`plan.json`), and
    /// every additionally requested file keyed by its name.
    ///
    /// # Errors
    ///
    /// Returns an error if a command fails or produces invalid output, or if
    /// an included file cannot be read.
    fn execute_test(
        &self,
        directory: &Path,
        include_files: &[String],
    ) -> Result<Outputs, TerraformError>;
}

/// Errors raised while running Terraform.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum TerraformError {
    /// The binary could not be started.
    #[display("could not run terraform {command}: {source}")]
    Spawn {
        /// The command that was started.
        command: &'static str,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The command exited unsuccessfully.
    #[display("terraform {command} failed ({status}):\n{stderr}")]
    Command {
        /// The command that failed.
        command: &'static str,
        /// Its exit status.
        status: ExitStatus,
        /// What the command wrote to stderr.
        stderr: String,
    },

    /// The command output was not the expected JSON.
    #[display("terraform {command} returned invalid JSON: {source}")]
    InvalidOutput {
        /// The command whose output was rejected.
        command: &'static str,
        /// The decoding error.
        source: serde_json::Error,
    },

    /// An additional file could not be read.
    #[display("could not read additional file ({name}): {source}")]
    IncludeFile {
        /// The file name, relative to the test directory.
        name: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// An additional `.json` file could not be decoded.
    #[display("could not unmarshal additional file ({name}): {source}")]
    InvalidIncludeFile {
        /// The file name, relative to the test directory.
        name: String,
        /// The decoding error.
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct VersionOutput {
    terraform_version: String,
}

/// A [`Terraform`] runner backed by a Terraform binary.
#[derive(Debug, Clone)]
pub struct TerraformBinary {
    binary: PathBuf,
    version: String,
}

impl TerraformBinary {
    /// Checks that `binary` is a working Terraform binary and records its version.
    ///
    /// # Errors
    ///
    /// Returns an error if `terraform version -json` cannot be run or decoded.
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self, TerraformError> {
        let binary = binary.into();
        let stdout = run(&binary, Path::new("."), "version", &["version", "-json"])?;
        let VersionOutput { terraform_version } =
            serde_json::from_str(&stdout).map_err(|source| TerraformError::InvalidOutput {
                command: "version",
                source,
            })?;
        debug!(binary = %binary.display(), version = %terraform_version, "terraform binary found");

        Ok(Self {
            binary,
            version: terraform_version,
        })
    }

    fn run(
        &self,
        directory: &Path,
        command: &'static str,
        args: &[&str],
    ) -> Result<String, TerraformError> {
        run(&self.binary, directory, command, args)
    }

    fn run_json(
        &self,
        directory: &Path,
        command: &'static str,
        args: &[&str],
    ) -> Result<File, TerraformError> {
        let stdout = self.run(directory, command, args)?;
        File::from_json(&stdout).map_err(|source| TerraformError::InvalidOutput { command, source })
    }
}

impl Terraform for TerraformBinary {
    fn version(&self) -> &str {
        &self.version
    }

    fn execute_test(
        &self,
        directory: &Path,
        include_files: &[String],
    ) -> Result<Outputs, TerraformError> {
        self.run(directory, "init", &["init"])?;

        let mut outputs = Outputs::new();

        let plan = self.run(directory, "plan", &["plan", &format!("-out={PLAN_FILE}"), "-no-color"])?;
        outputs.insert("plan".to_string(), File::Raw(plan));

        let apply = self.run(directory, "apply", &["apply", "-json", PLAN_FILE])?;
        let apply = File::from_json_lines(&apply).map_err(|source| TerraformError::InvalidOutput {
            command: "apply",
            source,
        })?;
        outputs.insert("apply.json".to_string(), apply);

        let state = self.run_json(directory, "show state", &["show", "-json"])?;
        outputs.insert("state.json".to_string(), state);

        let plan = self.run_json(directory, "show plan", &["show", "-json", PLAN_FILE])?;
        outputs.insert("plan.json".to_string(), plan);

        for name in include_files {
            let file = read_include_file(directory, name)?;
            outputs.insert(name.clone(), file);
        }

        Ok(outputs)
    }
}

/// Reads a file named in the test specification, relative to the test directory.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if a `.json` file does not
/// hold valid JSON.
pub fn read_include_file(directory: &Path, name: &str) -> Result<File, TerraformError> {
    let raw = fs::read(directory.join(name)).map_err(|source| TerraformError::IncludeFile {
        name: name.to_string(),
        source,
    })?;
    File::new(name, &raw).map_err(|source| TerraformError::InvalidIncludeFile {
        name: name.to_string(),
        source,
    })
}

fn run(
    binary: &Path,
    directory: &Path,
    command: &'static str,
    args: &[&str],
) -> Result<String, TerraformError> {
    debug!(binary = %binary.display(), directory = %directory.display(), ?args, "running terraform {command}");
    let output = Command::new(binary)
        .args(args)
        .current_dir(directory)
        .env("TF_IN_AUTOMATION", "1")
        .output()
        .map_err(|source| TerraformError::Spawn { command, source })?;

    if !output.status.success() {
        return Err(TerraformError::Command {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
