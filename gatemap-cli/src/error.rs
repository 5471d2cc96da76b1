//! Error types emitted by the gatemap CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use gatemap_core::{CoordinateError, LocationError, PlacesError, RecencyError, RegionError};
use gatemap_data::{ClientBuildError, GateConfigError, RecencyStoreOpenError};
use gatemap_session::MapError;
use thiserror::Error;

/// Errors emitted by the gatemap CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Only one half of a coordinate was supplied.
    #[error("--latitude and --longitude must be given together")]
    IncompleteCoordinate,
    /// The supplied coordinate is out of range.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
    /// The configured region span is invalid.
    #[error(transparent)]
    InvalidRegion(#[from] RegionError),
    /// The query is shorter than the autocomplete minimum.
    #[error("query {query:?} is too short; type at least {min} characters")]
    QueryTooShort { query: String, min: usize },
    /// `--choose` does not name a listed candidate.
    #[error("cannot choose candidate {choice}: {available} candidates are listed")]
    InvalidChoice { choice: usize, available: usize },
    /// Constructing the places client failed.
    #[error("failed to build places client for {base_url:?}: {source}")]
    BuildPlacesClient {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// Opening the recent-places database failed.
    #[error("failed to open recent places at {path:?}: {source}")]
    OpenRecents {
        path: Utf8PathBuf,
        #[source]
        source: RecencyStoreOpenError,
    },
    /// Reading or writing the recent places failed.
    #[error(transparent)]
    Recency(#[from] RecencyError),
    /// The places provider failed.
    #[error(transparent)]
    Places(#[from] PlacesError),
    /// A marker interaction failed.
    #[error(transparent)]
    Map(#[from] MapError),
    /// Locating the device failed.
    #[error(transparent)]
    Location(#[from] LocationError),
    /// Loading the gate file failed.
    #[error(transparent)]
    Gates(#[from] GateConfigError),
    /// The async runtime could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
