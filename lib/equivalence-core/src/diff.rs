//! Comparison of a fresh output file against its golden file.

use std::fmt;

use similar::TextDiff;

const CONTEXT_RADIUS: usize = 3;

/// The outcome of comparing one output file against its golden file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDiff {
    /// No golden file exists yet.
    NewFile,
    /// The golden file matches exactly.
    NoChange,
    /// The golden file differs; holds a unified diff from golden to actual.
    Changed(String),
}

impl FileDiff {
    /// Compares the `actual` text of file `name` against its `golden` text, if any.
    #[must_use]
    pub fn compute(name: &str, golden: Option<&str>, actual: &str) -> Self {
        let Some(golden) = golden else {
            return Self::NewFile;
        };
        if golden == actual {
            return Self::NoChange;
        }

        let patch = TextDiff::from_lines(golden, actual)
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header(&format!("golden/{name}"), &format!("actual/{name}"))
            .to_string();
        Self::Changed(patch)
    }

    /// Returns true when the golden file must be created or updated.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewFile => f.write_str("new file"),
            Self::NoChange => f.write_str("no changes"),
            Self::Changed(patch) => f.write_str(patch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_new_file_without_golden() {
        let diff = FileDiff::compute("plan", None, "anything");

        assert_eq!(diff, FileDiff::NewFile);
        assert!(diff.has_changes());
    }

    #[test]
    fn should_report_no_change_for_identical_text() {
        let diff = FileDiff::compute("state.json", Some("{}\n"), "{}\n");

        assert_eq!(diff, FileDiff::NoChange);
        assert!(!diff.has_changes());
        assert_eq!(diff.to_string(), "no changes");
    }

    #[test]
    fn should_render_unified_diff() {
        let diff = FileDiff::compute("plan", Some("a\nb\nc\n"), "a\nB\nc\n");

        let FileDiff::Changed(patch) = &diff else {
            panic!("expected a change, got {diff:?}");
        };
        assert!(patch.starts_with("--- golden/plan\n+++ actual/plan\n"));
        assert!(patch.contains("-b\n+B\n"));
        assert!(patch.contains(" a\n"));
        assert!(diff.has_changes());
    }

    #[test]
    fn should_limit_context_around_changes() {
        let golden: String = (0..20).map(|line| format!("line {line}\n")).collect();
        let actual = golden.replace("line 10\n", "line ten\n");

        let FileDiff::Changed(patch) = FileDiff::compute("plan", Some(&golden), &actual) else {
            panic!("expected a change");
        };
        assert!(patch.contains(" line 7\n"));
        assert!(!patch.contains(" line 6\n"));
        assert!(patch.contains(" line 13\n"));
        assert!(!patch.contains(" line 14\n"));
    }
}
