use std::fs;
use std::path::{Path, PathBuf};

use equivalence_core::files::File;
use equivalence_core::terraform::{Outputs, Terraform, TerraformError, read_include_file};
use rstest::fixture;
use serde_json::{Value, json};
use tempfile::TempDir;
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A temporary directory holding a tests directory and a goldens directory.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    pub fn tests(&self) -> PathBuf {
        self.root.path().join("tests")
    }

    pub fn goldens(&self) -> PathBuf {
        self.root.path().join("goldens")
    }

    pub fn golden(&self, case: &str, file: &str) -> PathBuf {
        self.goldens().join(case).join(file)
    }

    /// Creates a test case directory with a Terraform configuration and an
    /// optional `spec.json`.
    pub fn add_case(&self, name: &str, specification: Option<Value>) -> anyhow::Result<PathBuf> {
        let directory = self.tests().join(name);
        fs::create_dir_all(&directory)?;
        fs::write(
            directory.join("main.tf"),
            "resource \"local_file\" \"a\" {\n  content  = \"hello\"\n  filename = \"a.txt\"\n}\n",
        )?;
        if let Some(specification) = specification {
            fs::write(
                directory.join("spec.json"),
                serde_json::to_string_pretty(&specification)?,
            )?;
        }
        Ok(directory)
    }

    pub fn write(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[fixture]
pub fn workspace() -> Workspace {
    init_tracing();
    match tempfile::tempdir() {
        Ok(root) => Workspace { root },
        Err(error) => panic!("fail to create temporary workspace: {error:?}"),
    }
}

/// A [`Terraform`] runner replaying canned outputs.
#[derive(Debug, Clone)]
pub struct MockTerraform {
    outputs: Outputs,
}

impl MockTerraform {
    pub fn with_content(content: &str) -> Self {
        let mut outputs = Outputs::new();
        outputs.insert(
            "plan".to_string(),
            File::Raw("Plan: 1 to add, 0 to change, 0 to destroy.\n".to_string()),
        );
        outputs.insert(
            "apply.json".to_string(),
            File::Json(json!([
                {
                    "@level": "info",
                    "@message": "Terraform 1.9.0",
                    "@timestamp": "2024-05-01T10:00:00.000000Z",
                    "type": "version"
                },
                {
                    "@level": "info",
                    "@message": "Apply complete! Resources: 1 added, 0 changed, 0 destroyed.",
                    "@timestamp": "2024-05-01T10:00:02.000000Z",
                    "type": "change_summary"
                }
            ])),
        );
        outputs.insert(
            "state.json".to_string(),
            File::Json(json!({
                "format_version": "1.0",
                "terraform_version": "1.9.0",
                "values": {
                    "root_module": {
                        "resources": [
                            {
                                "address": "local_file.a",
                                "values": {"id": "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed", "content": content}
                            }
                        ]
                    }
                }
            })),
        );
        outputs.insert(
            "plan.json".to_string(),
            File::Json(json!({
                "format_version": "1.2",
                "terraform_version": "1.9.0",
                "timestamp": "2024-05-01T09:59:58Z",
                "planned_values": {
                    "root_module": {
                        "resources": [
                            {"address": "local_file.a", "values": {"content": content}}
                        ]
                    }
                }
            })),
        );
        Self { outputs }
    }
}

impl Terraform for MockTerraform {
    fn version(&self) -> &str {
        "1.9.0"
    }

    fn execute_test(
        &self,
        directory: &Path,
        include_files: &[String],
    ) -> Result<Outputs, TerraformError> {
        let mut outputs = self.outputs.clone();
        for name in include_files {
            outputs.insert(name.clone(), read_include_file(directory, name)?);
        }
        Ok(outputs)
    }
}

#[fixture]
pub fn terraform() -> MockTerraform {
    MockTerraform::with_content("hello")
}

/// A [`Terraform`] runner whose `show` output is not JSON.
#[derive(Debug)]
pub struct BrokenTerraform;

impl Terraform for BrokenTerraform {
    fn version(&self) -> &str {
        "0.0.0"
    }

    fn execute_test(&self, _directory: &Path, _include_files: &[String]) -> Result<Outputs, TerraformError> {
        let source = match serde_json::from_str::<Value>("not json") {
            Ok(value) => panic!("unexpected valid json: {value}"),
            Err(error) => error,
        };
        Err(TerraformError::InvalidOutput {
            command: "show state",
            source,
        })
    }
}
