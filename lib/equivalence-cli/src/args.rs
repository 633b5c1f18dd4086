use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use pico_args::Arguments;

pub const HELP: &str = "\
Compare or update Terraform equivalence test golden files.

USAGE:
  equivalence-test <COMMAND> --goldens <DIR> --tests <DIR> [OPTIONS]

COMMANDS:
  diff      Compare a fresh run of the test cases against the golden files
  update    Run the test cases and overwrite the golden files

OPTIONS:
  -g, --goldens <DIR>   Directory containing the golden files
  -t, --tests <DIR>     Directory containing the test cases and specifications
  -b, --binary <PATH>   Terraform binary to test [default: terraform]
  -f, --filter <NAME>   Only run the named test case (repeatable)
      --strict          Exit with an error when diffs or failures are found (diff only)
  -v, --verbose         Log debug information
  -h, --help            Print this help
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Diff,
    Update,
}

/// The flags shared by every command.
#[derive(Debug)]
pub struct Args {
    pub command: Command,
    pub goldens: PathBuf,
    pub tests: PathBuf,
    pub binary: PathBuf,
    pub filters: Vec<String>,
    pub strict: bool,
    pub verbose: bool,
    /// Arguments left over once every flag is parsed.
    pub unused: Vec<OsString>,
}

impl Args {
    /// Parses the process arguments; `None` when help was requested.
    pub fn parse() -> Result<Option<Self>> {
        Self::from_arguments(Arguments::from_env())
    }

    pub fn from_vec(args: Vec<OsString>) -> Result<Option<Self>> {
        Self::from_arguments(Arguments::from_vec(args))
    }

    fn from_arguments(mut pargs: Arguments) -> Result<Option<Self>> {
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let command = match pargs.subcommand().context("parsing command")?.as_deref() {
            Some("diff") => Command::Diff,
            Some("update") => Command::Update,
            Some(other) => bail!("unknown command '{other}', expected 'diff' or 'update'"),
            None => bail!("missing command, expected 'diff' or 'update'"),
        };

        let goldens = pargs
            .value_from_str(["-g", "--goldens"])
            .context("parsing goldens argument")?;
        let tests = pargs
            .value_from_str(["-t", "--tests"])
            .context("parsing tests argument")?;
        let binary = pargs
            .opt_value_from_str(["-b", "--binary"])
            .context("parsing binary argument")?;
        let filters = pargs
            .values_from_str(["-f", "--filter"])
            .context("parsing filter argument")?;
        let strict = pargs.contains("--strict");
        let verbose = pargs.contains(["-v", "--verbose"]);

        let result = Self {
            command,
            goldens,
            tests,
            binary: binary.unwrap_or_else(|| PathBuf::from("terraform")),
            filters,
            strict,
            verbose,
            unused: pargs.finish(),
        };
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>> {
        Args::from_vec(args.iter().map(OsString::from).collect())
    }

    #[test]
    fn should_parse_diff_with_defaults() {
        let args = parse(&["diff", "--goldens", "goldens", "--tests", "tests"])
            .expect("valid arguments")
            .expect("not a help request");

        assert_eq!(args.command, Command::Diff);
        assert_eq!(args.goldens, PathBuf::from("goldens"));
        assert_eq!(args.tests, PathBuf::from("tests"));
        assert_eq!(args.binary, PathBuf::from("terraform"));
        assert!(args.filters.is_empty());
        assert!(!args.strict);
        assert!(!args.verbose);
        assert!(args.unused.is_empty());
    }

    #[test]
    fn should_parse_update_with_short_flags() {
        let args = parse(&[
            "update", "-g", "out", "-t", "cases", "-b", "/usr/bin/tofu", "-f", "one", "-f", "two",
            "-v",
        ])
        .expect("valid arguments")
        .expect("not a help request");

        assert_eq!(args.command, Command::Update);
        assert_eq!(args.binary, PathBuf::from("/usr/bin/tofu"));
        assert_eq!(args.filters, vec!["one".to_string(), "two".to_string()]);
        assert!(args.verbose);
    }

    #[test]
    fn should_keep_unused_arguments() {
        let args = parse(&["diff", "-g", "g", "-t", "t", "--color"])
            .expect("valid arguments")
            .expect("not a help request");

        assert_eq!(args.unused, vec![OsString::from("--color")]);
    }

    #[test]
    fn should_request_help() {
        let args = parse(&["diff", "--help"]).expect("valid arguments");

        assert!(args.is_none());
    }

    #[test]
    fn should_require_goldens() {
        let result = parse(&["diff", "--tests", "tests"]);

        assert!(result.is_err());
    }

    #[test]
    fn should_reject_unknown_command() {
        let error = parse(&["compare", "-g", "g", "-t", "t"]).expect_err("unknown command");

        assert_eq!(
            error.to_string(),
            "unknown command 'compare', expected 'diff' or 'update'"
        );
    }
}
