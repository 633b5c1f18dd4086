use std::io::Write;
use std::path::Path;

use anyhow::Result;
use equivalence_core::cases::TestCase;
use equivalence_core::diff::FileDiff;
use equivalence_core::terraform::Terraform;
use tracing::debug;

/// Counters reported once every case has run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub attempted: usize,
    pub successful: usize,
    pub with_diffs: usize,
    pub failed: usize,
}

impl Summary {
    pub fn has_problems(&self) -> bool {
        self.with_diffs > 0 || self.failed > 0
    }

    fn write(&self, out: &mut impl Write, report_diffs: bool) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "Equivalence testing complete.")?;
        writeln!(out, "\tAttempted {} test(s).", self.attempted)?;
        if self.successful > 0 {
            writeln!(out, "\t{} test(s) were successful.", self.successful)?;
        }
        if report_diffs && self.with_diffs > 0 {
            writeln!(out, "\t{} test(s) had diffs.", self.with_diffs)?;
        }
        if self.failed > 0 {
            writeln!(out, "\t{} test(s) failed.", self.failed)?;
        }
        Ok(())
    }
}

/// Runs every case and reports how its outputs differ from the golden files.
///
/// A failing case is reported and counted, it does not stop the run.
pub fn diff(
    cases: &[TestCase],
    terraform: &dyn Terraform,
    goldens: &Path,
    out: &mut impl Write,
) -> Result<Summary> {
    let mut summary = Summary {
        attempted: cases.len(),
        ..Summary::default()
    };

    for case in cases {
        writeln!(out, "\n[{}]: starting...", case.name)?;

        let output = match case.run_with(terraform) {
            Ok(output) => output,
            Err(error) => {
                summary.failed += 1;
                writeln!(out, "[{}]: {error}", case.name)?;
                continue;
            }
        };

        writeln!(out, "[{}]: computing diffs...", case.name)?;
        let diffs = match output.compute_diff(goldens) {
            Ok(diffs) => diffs,
            Err(error) => {
                summary.failed += 1;
                writeln!(out, "[{}]: {error}", case.name)?;
                continue;
            }
        };

        for (file, diff) in &diffs {
            match diff {
                FileDiff::NewFile => writeln!(out, "[{}]: {file} was a new file", case.name)?,
                FileDiff::NoChange => writeln!(out, "[{}]: {file} had no diffs", case.name)?,
                FileDiff::Changed(patch) => {
                    writeln!(out, "[{}]: {file} had diffs:\n{patch}", case.name)?;
                }
            }
        }

        summary.successful += 1;
        if diffs.values().any(FileDiff::has_changes) {
            summary.with_diffs += 1;
        }
        writeln!(out, "[{}]: complete", case.name)?;
    }

    summary.write(out, true)?;
    debug!(?summary, "diff finished");
    Ok(summary)
}

/// Runs every case and overwrites its golden files with the outputs.
pub fn update(
    cases: &[TestCase],
    terraform: &dyn Terraform,
    goldens: &Path,
    out: &mut impl Write,
) -> Result<Summary> {
    let mut summary = Summary {
        attempted: cases.len(),
        ..Summary::default()
    };

    for case in cases {
        writeln!(out, "\n[{}]: starting...", case.name)?;

        let output = match case.run_with(terraform) {
            Ok(output) => output,
            Err(error) => {
                summary.failed += 1;
                writeln!(out, "[{}]: {error}", case.name)?;
                continue;
            }
        };

        writeln!(out, "[{}]: updating golden files...", case.name)?;
        if let Err(error) = output.update_golden_files(goldens) {
            summary.failed += 1;
            writeln!(out, "[{}]: {error}", case.name)?;
            continue;
        }

        summary.successful += 1;
        writeln!(out, "[{}]: complete", case.name)?;
    }

    summary.write(out, false)?;
    debug!(?summary, "update finished");
    Ok(summary)
}
