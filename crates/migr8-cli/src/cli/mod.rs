//! Command-line interface definition.
//!
//! - `migr8 [run] [OPTIONS] [PATTERNS]...` - run the migration (the default)
//! - `migr8 list` - print the available rules

mod commands;
mod tests;

use clap::Parser;

pub use commands::{Command, RunArgs};

/// migr8 - migrate Sentry JavaScript SDK usage from v7 to v8
#[derive(Parser, Debug)]
#[command(
    name = "migr8",
    version,
    about = "Migrate Sentry JavaScript SDK usage from v7 to v8",
    long_about = "migr8 rewrites code that uses v7 APIs of the Sentry JavaScript SDKs\n\
                  to their v8 equivalents and updates the SDK packages.\n\
                  Places it cannot migrate safely get a `// TODO(sentry):` comment.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute; `run` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    /// The run arguments that apply, if the command is a run
    pub fn run_args(&self) -> Option<&RunArgs> {
        match &self.command {
            Some(Command::Run(args)) => Some(args),
            Some(Command::List) => None,
            None => Some(&self.run),
        }
    }

    /// The command to execute
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}
