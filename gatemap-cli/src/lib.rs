//! Command-line front end for the gatemap place-search core.
//!
//! Each subcommand layers its configuration from defaults, configuration
//! files, `GATEMAP_*` environment variables and flags, then drives the same
//! controllers a map screen would.
#![forbid(unsafe_code)]

use std::future::Future;
use std::io::Write;

use clap::{Parser, Subcommand};

mod error;
mod gates;
mod places;
mod recent;
mod services;

pub use error::CliError;

use gates::GatesArgs;
use places::{DetailsArgs, SearchArgs};
use recent::RecentArgs;
use services::{DefaultServices, Services};

pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_PLACES_BASE_URL: &str = "places-base-url";
pub(crate) const ARG_RECENTS_DB: &str = "recents-db";
pub(crate) const ARG_GATES_FILE: &str = "gates-file";
pub(crate) const ARG_LATITUDE: &str = "latitude";
pub(crate) const ARG_LONGITUDE: &str = "longitude";
pub(crate) const ARG_PLACE_ID: &str = "place-id";
pub(crate) const ENV_SEARCH_API_KEY: &str = "GATEMAP_CMDS_SEARCH_API_KEY";
pub(crate) const ENV_DETAILS_API_KEY: &str = "GATEMAP_CMDS_DETAILS_API_KEY";
pub(crate) const ENV_DETAILS_PLACE_ID: &str = "GATEMAP_CMDS_DETAILS_PLACE_ID";
pub(crate) const ENV_GATES_API_KEY: &str = "GATEMAP_CMDS_GATES_API_KEY";

/// Location of the recent-places database when none is configured.
pub(crate) const DEFAULT_RECENTS_DB: &str = ".gatemap/recents.sqlite";

/// Run the gatemap CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid or the
/// command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &DefaultServices, &mut stdout)
}

fn run_command(
    command: Command,
    services: &dyn Services,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Search(args) => places::run_search(args, services, writer),
        Command::Details(args) => places::run_details(args, services, writer),
        Command::Recent(args) => recent::run_recent(args, services, writer),
        Command::Gates(args) => gates::run_gates(args, services, writer),
    }
}

/// Drive `future` to completion on a single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

pub(crate) fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writeln!(writer, "{line}").map_err(CliError::WriteOutput)
}

pub(crate) fn write_json<T: serde::Serialize>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    write_line(writer, &payload)
}

#[derive(Debug, Parser)]
#[command(
    name = "gatemap",
    about = "Search for places, recall recent choices and inspect gates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Autocomplete a query and optionally choose one of the candidates.
    Search(SearchArgs),
    /// Fetch the details of a place.
    Details(DetailsArgs),
    /// List or clear the recently chosen places.
    Recent(RecentArgs),
    /// List the gate markers, optionally around a position.
    Gates(GatesArgs),
}

#[cfg(test)]
mod tests;
