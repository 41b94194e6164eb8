//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Session Review - Flag suspicious council session records for human review
#[derive(Parser, Debug)]
#[command(name = "session-review")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human, json)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (replaces the global and project config files)
    #[arg(long, global = true, env = "SESSION_REVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project directory containing the .wrangler state (default: current dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective output format.
    ///
    /// An explicit `--output-format` wins over `--machine`.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if let Some(fmt) = self.output_format {
            return fmt;
        }
        OutputFormat::from_args(self.machine, None)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the detection rules and queue flagged sessions for review
    Flag(commands::flag::FlagArgs),

    /// List the available detection criteria
    Criteria(commands::criteria::CriteriaArgs),

    /// Print the path of the local database that would be used
    Locate(commands::locate::LocateArgs),
}
