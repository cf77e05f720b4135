//! Logging setup for the migr8 CLI.
//!
//! Log output goes to stderr so it never mixes with command output such as
//! `migr8 list`.
//!
//! The filter is picked in this order:
//! 1. `--verbose` / `--debug`: debug level for migr8 crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. Default: info for the CLI, warnings from the engine

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "migr8=debug,migr8_cli=debug,migr8_core=debug";
const QUIET_FILTER: &str = "migr8=error,migr8_cli=error,migr8_core=error";
const DEFAULT_FILTER: &str = "migr8=info,migr8_cli=info,migr8_core=warn";

/// Pick the filter for the given flags
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber; call once, before any logging
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A second call (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .try_init();
}
