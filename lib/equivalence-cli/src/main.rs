#![allow(missing_docs)]
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use equivalence_core::cases::TestCase;
use equivalence_core::terraform::{Terraform, TerraformBinary};
use tracing::{Level, info, warn};

mod args;
mod commands;

use self::args::{Args, Command, HELP};

fn main() -> Result<ExitCode> {
    let Some(args) = Args::parse().context("parsing arguments")? else {
        io::stdout().write_all(HELP.as_bytes())?;
        return Ok(ExitCode::SUCCESS);
    };

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if !args.unused.is_empty() {
        warn!(remaining = ?args.unused, "Warning: unused arguments left");
    }
    if args.strict && args.command == Command::Update {
        warn!("--strict only applies to the diff command");
    }

    let mut cases = TestCase::read_all(&args.tests)
        .with_context(|| format!("reading test cases from {}", args.tests.display()))?;
    if !args.filters.is_empty() {
        for filter in &args.filters {
            if !cases.iter().any(|case| &case.name == filter) {
                warn!(%filter, "no test case matches filter");
            }
        }
        cases.retain(|case| args.filters.contains(&case.name));
    }

    let terraform = TerraformBinary::new(&args.binary)
        .with_context(|| format!("checking terraform binary {}", args.binary.display()))?;
    info!(version = terraform.version(), "using terraform");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Found {} test cases in {}", cases.len(), args.tests.display())?;

    let summary = match args.command {
        Command::Diff => commands::diff(&cases, &terraform, &args.goldens, &mut out)?,
        Command::Update => commands::update(&cases, &terraform, &args.goldens, &mut out)?,
    };
    out.flush()?;

    if args.strict && args.command == Command::Diff && summary.has_problems() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
