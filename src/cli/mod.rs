mod config;
mod run;

pub use config::handle_config;
pub use run::{build_agent, build_registry, handle_commands, handle_run};

use crate::console::VerbosityLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Increase verbosity (-v verbose, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode - only show errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script of command calls, one JSON object per line
    Run {
        /// Script file
        script: PathBuf,

        /// Open a file or folder in the agent context before running
        #[arg(long = "open")]
        open: Vec<PathBuf>,

        /// Agent name (overrides config)
        #[arg(long)]
        name: Option<String>,

        /// Replay operator answers from a file instead of the terminal
        #[arg(long)]
        answers: Option<PathBuf>,
    },
    /// List the commands available to the agent
    Commands {
        /// Open a file or folder in the agent context first
        #[arg(long = "open")]
        open: Vec<PathBuf>,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

impl Cli {
    pub fn get_verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else {
            match self.verbose {
                0 => VerbosityLevel::Normal,
                1 => VerbosityLevel::Verbose,
                _ => VerbosityLevel::Debug,
            }
        }
    }

    pub fn get_effective_verbosity(&self, config_verbosity: VerbosityLevel) -> VerbosityLevel {
        if self.quiet || self.verbose > 0 {
            self.get_verbosity()
        } else {
            config_verbosity
        }
    }
}
