//! Command implementations and argument parsing for the seatyr CLI.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use seatyr_core::{
    detect_conflicts, generate_plans, normalize, summarize_plan, GenerateOptions, Plan,
    RawAdjacents, RawAssignments, RawConstraints, RawGuest, RawTable, ValidationError,
};
use serde::Deserialize;
use thiserror::Error;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "seatyr", about = "Run the seatyr seating-assignment solver.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate seating plans for an input file and print the top plan.
    Run(RunArgs),
    /// Validate an input file and report conflicts without searching for plans.
    Check(CheckArgs),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Path to a JSON file shaped as
    /// `{ guests, tables, constraints, adjacents, assignments, options? }`.
    pub input: PathBuf,

    /// Use the premium-tier search budget instead of the free-tier default.
    ///
    /// Ignored when the input file supplies its own `options` object.
    #[arg(long)]
    pub premium: bool,
}

/// Options accepted by the `check` command.
#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Path to the same JSON shape accepted by `run`.
    pub input: PathBuf,
}

/// The JSON document read from the `run`/`check` input file.
#[derive(Debug, Clone, Deserialize)]
struct InputDocument {
    guests: Vec<RawGuest>,
    tables: Vec<RawTable>,
    #[serde(default)]
    constraints: RawConstraints,
    #[serde(default)]
    adjacents: RawAdjacents,
    #[serde(default)]
    assignments: RawAssignments,
    #[serde(default)]
    options: Option<GenerateOptions>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading the input document.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The input file was not valid JSON, or did not match the expected shape.
    #[error("failed to parse `{path}` as a seatyr input document: {source}")]
    Parse {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// The outcome of running the `run` command.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Every plan `generate_plans` returned, score-sorted.
    pub plans: Vec<Plan>,
    /// Human-readable summary of the highest-scoring plan, if any.
    pub top_summary: Option<String>,
    /// Validation errors accumulated while normalizing and validating input.
    pub errors: Vec<ValidationError>,
}

/// The outcome of running the `check` command.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Validation errors accumulated while normalizing and validating input.
    pub errors: Vec<ValidationError>,
}

/// The result of executing a parsed [`Cli`] invocation.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Result of the `run` command.
    Run(RunOutcome),
    /// Result of the `check` command.
    Check(CheckOutcome),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the input file cannot be read or parsed.
pub fn run_cli(cli: Cli) -> Result<Outcome, CliError> {
    match cli.command {
        Command::Run(args) => run_command(args).map(Outcome::Run),
        Command::Check(args) => check_command(args).map(Outcome::Check),
    }
}

fn read_input(path: &Path) -> Result<InputDocument, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn run_command(args: RunArgs) -> Result<RunOutcome, CliError> {
    let document = read_input(&args.input)?;
    let options = document.options.unwrap_or_else(|| {
        if args.premium {
            GenerateOptions::premium()
        } else {
            GenerateOptions::free()
        }
    });

    let (plans, errors) = generate_plans(
        &document.guests,
        &document.tables,
        &document.constraints,
        &document.adjacents,
        &document.assignments,
        &options,
    );

    let top_summary = plans.first().map(|plan| {
        let (normalized, _) = normalize(
            &document.guests,
            &document.tables,
            &document.constraints,
            &document.adjacents,
            &document.assignments,
        );
        summarize_plan(plan, &normalized.guests, &normalized.tables)
    });

    Ok(RunOutcome {
        plans,
        top_summary,
        errors,
    })
}

fn check_command(args: CheckArgs) -> Result<CheckOutcome, CliError> {
    let document = read_input(&args.input)?;
    let errors = detect_conflicts(
        &document.guests,
        &document.tables,
        &document.constraints,
        &document.adjacents,
        &document.assignments,
    );
    Ok(CheckOutcome { errors })
}

/// Renders `outcome` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_outcome(outcome: &Outcome, mut writer: impl Write) -> io::Result<()> {
    match outcome {
        Outcome::Run(run) => render_run_outcome(run, &mut writer),
        Outcome::Check(check) => render_validation_errors(&check.errors, &mut writer),
    }
}

fn render_run_outcome(outcome: &RunOutcome, mut writer: impl Write) -> io::Result<()> {
    if !outcome.errors.is_empty() {
        render_validation_errors(&outcome.errors, &mut writer)?;
    }

    match (&outcome.top_summary, outcome.plans.len()) {
        (Some(summary), count) => {
            writeln!(writer, "{count} plan(s) found. Top plan:\n")?;
            write!(writer, "{summary}")?;
        }
        (None, _) => writeln!(writer, "No plans could be generated.")?,
    }
    Ok(())
}

fn render_validation_errors(errors: &[ValidationError], mut writer: impl Write) -> io::Result<()> {
    if errors.is_empty() {
        return writeln!(writer, "No conflicts found.");
    }
    writeln!(writer, "{} conflict(s) found:", errors.len())?;
    for error in errors {
        writeln!(writer, "  [{}] {}", error.kind.as_str(), error.message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests require contextual panics")]
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("fixture write must succeed");
        path
    }

    #[test]
    fn run_command_produces_a_plan_for_trivial_input() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_input(
            &dir,
            "input.json",
            r#"{
                "guests": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
                "tables": [{"id": "T1", "capacity": 4}]
            }"#,
        );
        let outcome = run_command(RunArgs { input: path, premium: false }).expect("run must succeed");
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.plans.len(), 1);
        assert!(outcome.top_summary.is_some());
    }

    #[test]
    fn check_command_reports_contradictions() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_input(
            &dir,
            "input.json",
            r#"{
                "guests": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
                "tables": [{"id": "T1", "capacity": 4}],
                "constraints": {
                    "A": {"B": "must", "C": "cannot"},
                    "B": {"C": "must"}
                }
            }"#,
        );
        let outcome = check_command(CheckArgs { input: path }).expect("check must succeed");
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn read_input_rejects_malformed_json() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_input(&dir, "input.json", "not json");
        let err = read_input(&path).expect_err("malformed JSON must fail");
        assert!(matches!(err, CliError::Parse { .. }));
    }

    #[test]
    fn read_input_rejects_missing_files() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("missing.json");
        let err = read_input(&path).expect_err("missing file must fail");
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn render_run_outcome_reports_no_plans() {
        let outcome = Outcome::Run(RunOutcome {
            plans: Vec::new(),
            top_summary: None,
            errors: Vec::new(),
        });
        let mut buffer = Vec::new();
        render_outcome(&outcome, &mut buffer).expect("render must succeed");
        let text = String::from_utf8(buffer).expect("utf8 output");
        assert!(text.contains("No plans could be generated."));
    }

    #[test]
    fn render_check_outcome_lists_conflicts() {
        let outcome = Outcome::Check(CheckOutcome {
            errors: vec![ValidationError::new(
                seatyr_core::ErrorKind::UnknownGuest,
                "guest `X` is unknown".to_owned(),
                seatyr_core::ValidationDetails::None,
            )],
        });
        let mut buffer = Vec::new();
        render_outcome(&outcome, &mut buffer).expect("render must succeed");
        let text = String::from_utf8(buffer).expect("utf8 output");
        assert!(text.contains("1 conflict(s) found"));
        assert!(text.contains("unknown_guest"));
    }

    #[test]
    fn clap_parses_run_subcommand_with_premium_flag() {
        let cli = Cli::try_parse_from(["seatyr", "run", "input.json", "--premium"])
            .expect("parse must succeed");
        match cli.command {
            Command::Run(args) => {
                assert!(args.premium);
                assert_eq!(args.input, PathBuf::from("input.json"));
            }
            Command::Check(_) => panic!("expected Run"),
        }
    }

    #[test]
    fn clap_parses_check_subcommand() {
        let cli = Cli::try_parse_from(["seatyr", "check", "input.json"]).expect("parse must succeed");
        assert!(matches!(cli.command, Command::Check(_)));
    }
}
