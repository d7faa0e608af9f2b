//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod options;
pub mod plan_command;
pub mod stats_command;

pub use command_traits::{Command, CommandFactory};
pub use plan_command::PlanCommand;
pub use stats_command::{StatsCommand, TileStats};

use clap::ArgMatches;
use crate::errors::TileResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
#[derive(Default)]
pub struct TiletiffCommandFactory;

impl TiletiffCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        TiletiffCommandFactory
    }
}

impl CommandFactory for TiletiffCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> TileResult<Box<dyn Command>> {
        if args.get_flag("stats") {
            Ok(Box::new(StatsCommand::new(args)?))
        } else {
            // Default to printing the plan
            Ok(Box::new(PlanCommand::new(args)?))
        }
    }
}
