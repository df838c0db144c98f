//! Command-line interface orchestration for the seatyr seating solver.
//!
//! The CLI offers a `run` subcommand that reads a JSON input document and
//! prints a human-readable summary of the best plan found, and a `check`
//! subcommand that reports validation conflicts without running the search.

mod commands;

pub use commands::{
    render_outcome, run_cli, CheckArgs, CheckOutcome, Cli, CliError, Command, Outcome, RunArgs,
    RunOutcome,
};
