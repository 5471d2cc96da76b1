//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use gatemap_cli::CliError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `gatemap_session=debug`.
const LOG_FILTER_ENV: &str = "GATEMAP_LOG";

fn main() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match gatemap_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("gatemap: {err}");
            std::process::exit(1);
        }
    }
}
