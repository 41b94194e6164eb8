//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod criteria;
pub mod flag;
pub mod locate;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Flag(args) => flag::run(ctx, args),
        Commands::Criteria(args) => criteria::run(ctx, args),
        Commands::Locate(args) => locate::run(ctx, args),
    }
}
