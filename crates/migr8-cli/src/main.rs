//! migr8 - migrate Sentry JavaScript SDK usage from v7 to v8.
//!
//! Parses the command line, sets up logging, and dispatches to a command.

use std::process::ExitCode;

use clap::Parser;
use migr8_cli::{cli, commands, error, logger, ui};

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    let verbose = args.verbose || args.run_args().is_some_and(|run| run.debug);
    let no_color = args.no_color || !ui::should_use_color();
    logger::init_logger(verbose, args.quiet, no_color);
    ui::init_colors(no_color);

    let result = match args.into_command() {
        cli::Command::Run(run_args) => commands::run_execute(run_args),
        cli::Command::List => commands::list_execute().map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        // Declining a prompt is a clean exit.
        Err(error::CliError::Cancelled) => {
            ui::info(commands::CANCELLED_MESSAGE);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{:?}", error::cli_error_to_miette(err));
            ExitCode::FAILURE
        }
    }
}
