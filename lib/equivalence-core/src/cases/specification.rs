use std::fs;
use std::io;
use std::path::{Component, Path};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Deserializer;
use tracing::debug;

use super::error::CaseError;
use crate::json::{Field, Filter, Selector, Step};

/// Name of the specification file inside a test case directory.
pub const SPECIFICATION_FILE: &str = "spec.json";

/// Fields ignored for every test case, ahead of the case's own fields.
///
/// These hold values that change on every run: timestamps and the version of
/// the binary that produced the output.
pub const DEFAULT_IGNORED_FIELDS: &[(&str, &[&str])] = &[
    ("apply.json", &["*.@timestamp"]),
    ("plan.json", &["terraform_version", "timestamp"]),
    ("state.json", &["terraform_version"]),
];

/// The content of a test case's `spec.json`.
///
/// ```json
/// {
///   "description": "Creates a local file",
///   "include_files": ["output.json"],
///   "ignore_fields": {
///     "state.json": ["values.root_module.resources.*.values.id"],
///     "apply.json": [
///       { "steps": [{ "step": "*", "filters": [{ "path": ["type"], "value": "version" }] }] }
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Specification {
    /// Free text describing the test case.
    #[serde(default)]
    pub description: Option<String>,

    /// Additional files, relative to the test directory, to record next to
    /// the Terraform outputs.
    #[serde(default)]
    pub include_files: Vec<String>,

    /// Fields to strip before comparison, keyed by output file name.
    #[serde(default)]
    pub ignore_fields: IndexMap<String, Vec<FieldEntry>>,
}

/// One field to ignore, as written in `spec.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry {
    /// A dotted path such as `values.outputs.*.value`.
    Path(String),
    /// Explicit steps, for filters or keys containing dots.
    Steps {
        /// The steps, root first.
        steps: Vec<StepEntry>,
    },
}

/// One step of a [`FieldEntry::Steps`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepEntry {
    /// A key, an index or `*`.
    pub step: String,
    /// Conditions that must all hold for the step to apply.
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl From<&StepEntry> for Step {
    fn from(entry: &StepEntry) -> Self {
        entry
            .filters
            .iter()
            .cloned()
            .fold(Step::new(Selector::parse(&entry.step)), Step::with_filter)
    }
}

impl From<&FieldEntry> for Field {
    fn from(entry: &FieldEntry) -> Self {
        match entry {
            FieldEntry::Path(path) => Field::parse(path),
            FieldEntry::Steps { steps } => Field::new(steps.iter().map(Step::from).collect()),
        }
    }
}

impl Specification {
    /// Reads `spec.json` from a test case directory.
    ///
    /// A missing file yields the default specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded, or
    /// if an include file name is absolute or contains `..`.
    pub fn read(directory: &Path) -> Result<Self, CaseError> {
        let path = directory.join(SPECIFICATION_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no specification, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(CaseError::Io { path, source }),
        };

        let specification =
            Self::parse(&text).map_err(|error| CaseError::InvalidSpecification {
                path: path.clone(),
                location: error.path().to_string(),
                source: error.into_inner(),
            })?;

        if let Some(name) = specification
            .include_files
            .iter()
            .find(|name| !is_contained(name))
        {
            return Err(CaseError::InvalidIncludeFile {
                path,
                name: name.clone(),
            });
        }
        Ok(specification)
    }

    /// Decodes a specification, reporting the JSON path of any error.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid specification.
    pub fn parse(text: &str) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
        let deserializer = &mut Deserializer::from_str(text);
        serde_path_to_error::deserialize(deserializer)
    }

    /// The fields to strip from output file `name`: defaults first, then the
    /// ones configured for this case.
    #[must_use]
    pub fn fields_for(&self, name: &str) -> Vec<Field> {
        let defaults = DEFAULT_IGNORED_FIELDS
            .iter()
            .filter(|(file, _)| *file == name)
            .flat_map(|(_, paths)| paths.iter().copied().map(Field::parse));

        let configured = self
            .ignore_fields
            .get(name)
            .into_iter()
            .flatten()
            .map(Field::from);

        defaults.chain(configured).collect()
    }
}

/// Include file names must be relative and stay inside the case directory.
fn is_contained(name: &str) -> bool {
    let path = Path::new(name);
    path.file_name().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn should_parse_full_specification() {
        let text = r#"{
            "description": "local file",
            "include_files": ["output.json"],
            "ignore_fields": {
                "state.json": ["values.root_module.resources.*.values.id"],
                "apply.json": [
                    {"steps": [{"step": "*", "filters": [{"path": ["type"], "value": "version"}]}]}
                ]
            }
        }"#;

        let specification = Specification::parse(text).expect("valid specification");

        assert_eq!(specification.description.as_deref(), Some("local file"));
        assert_eq!(specification.include_files, vec!["output.json".to_string()]);
        assert_eq!(
            specification.ignore_fields.get("state.json"),
            Some(&vec![FieldEntry::Path(
                "values.root_module.resources.*.values.id".to_string()
            )])
        );
        assert_eq!(
            specification.ignore_fields.get("apply.json"),
            Some(&vec![FieldEntry::Steps {
                steps: vec![StepEntry {
                    step: "*".to_string(),
                    filters: vec![Filter::new(["type"], "version")],
                }],
            }])
        );
    }

    #[test]
    fn should_parse_empty_specification() {
        let specification = Specification::parse("{}").expect("valid specification");

        assert_eq!(specification, Specification::default());
    }

    #[test]
    fn should_report_location_of_invalid_entry() {
        let error = Specification::parse(r#"{"include_files": ["a.json", 3]}"#)
            .expect_err("include file must be a string");

        assert_eq!(error.path().to_string(), "include_files[1]");
    }

    #[rstest]
    #[case::apply("apply.json", &["*.@timestamp"])]
    #[case::plan("plan.json", &["terraform_version", "timestamp"])]
    #[case::state("state.json", &["terraform_version"])]
    #[case::raw_plan("plan", &[])]
    #[case::include_file("output.json", &[])]
    fn should_provide_default_fields(#[case] name: &str, #[case] expected: &[&str]) {
        let fields: Vec<String> = Specification::default()
            .fields_for(name)
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(fields, expected);
    }

    #[test]
    fn should_append_configured_fields_after_defaults() {
        let specification = Specification::parse(
            r#"{"ignore_fields": {"state.json": ["values.outputs", {"steps": [{"step": "values"}, {"step": "root_module.x"}]}]}}"#,
        )
        .expect("valid specification");

        let fields = specification.fields_for("state.json");

        let rendered: Vec<String> = fields.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["terraform_version", "values.outputs", "values.root_module.x"]
        );
        // A structured step keeps dots inside a single key.
        assert_eq!(fields[2].steps().len(), 2);
    }

    #[test]
    fn should_build_filtered_step_from_entry() {
        let entry: FieldEntry = serde_json::from_value(json!({
            "steps": [
                {"step": "resources"},
                {"step": "*", "filters": [{"path": ["mode"], "value": "data"}]},
                {"step": "0"}
            ]
        }))
        .expect("valid entry");

        let field = Field::from(&entry);

        assert_eq!(field.to_string(), r#"resources.*[mode=="data"].0"#);
        assert_eq!(field.steps()[2].selector(), &Selector::Index(0));
    }

    #[test]
    fn should_default_when_specification_is_missing() -> anyhow::Result<()> {
        let directory = tempfile::tempdir()?;

        let specification = Specification::read(directory.path())?;

        assert_eq!(specification, Specification::default());
        Ok(())
    }

    #[test]
    fn should_fail_on_invalid_specification_file() -> anyhow::Result<()> {
        let directory = tempfile::tempdir()?;
        fs::write(
            directory.path().join(SPECIFICATION_FILE),
            r#"{"ignore_fields": {"state.json": [true]}}"#,
        )?;

        let error = Specification::read(directory.path()).expect_err("invalid field entry");

        assert!(matches!(error, CaseError::InvalidSpecification { .. }));
        Ok(())
    }

    #[rstest]
    #[case::file("output.json", true)]
    #[case::nested("outputs/result.json", true)]
    #[case::current_dir("./notes.txt", true)]
    #[case::parent("../other/x.json", false)]
    #[case::inner_parent("outputs/../../x.json", false)]
    #[case::absolute("/etc/passwd", false)]
    #[case::empty("", false)]
    #[case::dot(".", false)]
    fn should_check_include_file_stays_in_case(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_contained(name), expected);
    }

    #[test]
    fn should_reject_include_file_outside_case() -> anyhow::Result<()> {
        let directory = tempfile::tempdir()?;
        fs::write(
            directory.path().join(SPECIFICATION_FILE),
            r#"{"include_files": ["result.json", "../other/x.json"]}"#,
        )?;

        let error = Specification::read(directory.path()).expect_err("include file escapes");

        assert!(matches!(
            error,
            CaseError::InvalidIncludeFile { ref name, .. } if name == "../other/x.json"
        ));
        Ok(())
    }
}
