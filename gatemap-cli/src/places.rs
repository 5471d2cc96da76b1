//! `search` and `details` command implementations.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use gatemap_core::{PlaceDetail, PlacesError, Region};
use gatemap_session::{
    Listing, MIN_QUERY_CHARS, QueryOutcome, SearchSessionController, SearchStatus,
};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::services::{PlacesConfig, Services};
use crate::{
    ARG_API_KEY, ARG_PLACE_ID, ARG_PLACES_BASE_URL, ARG_RECENTS_DB, CliError, DEFAULT_RECENTS_DB,
    ENV_DETAILS_API_KEY, ENV_DETAILS_PLACE_ID, ENV_SEARCH_API_KEY, block_on, write_json,
    write_line,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Autocomplete a query against the places provider. With an \
                 empty query the recently chosen places are listed instead. \
                 Choosing a candidate remembers it and prints its details and \
                 the map region centred on it.",
    about = "Search for a place"
)]
#[ortho_config(prefix = "GATEMAP")]
pub(crate) struct SearchArgs {
    /// Text typed into the search field.
    #[arg(value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Choose the n-th listed candidate (1-based).
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) choose: Option<usize>,
    /// API key for the places provider.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Endpoint root of the places provider.
    #[arg(long = ARG_PLACES_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) places_base_url: Option<String>,
    /// Path to the recent-places database.
    #[arg(long = ARG_RECENTS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) recents_db: Option<Utf8PathBuf>,
}

impl SearchArgs {
    fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchConfig {
    pub(crate) query: String,
    pub(crate) choose: Option<usize>,
    pub(crate) places: PlacesConfig,
    pub(crate) recents_db: Utf8PathBuf,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args.query.unwrap_or_default();
        let places = if query.is_empty() && args.choose.is_none() {
            // Only the recent places are listed; the provider is never contacted.
            PlacesConfig::without_key(args.places_base_url)
        } else {
            PlacesConfig::resolve(args.api_key, args.places_base_url, ENV_SEARCH_API_KEY)?
        };
        Ok(Self {
            query,
            choose: args.choose,
            places,
            recents_db: args
                .recents_db
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_RECENTS_DB)),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChosenReport<'a> {
    detail: &'a PlaceDetail,
    region: Region,
}

pub(crate) fn run_search(
    args: SearchArgs,
    services: &dyn Services,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let session = SearchSessionController::new(
        services.places(&config.places)?,
        services.recents(&config.recents_db)?,
    );
    block_on(search_with(&session, &config, writer))?
}

async fn search_with(
    session: &SearchSessionController,
    config: &SearchConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    if session.update_query(&config.query).await == QueryOutcome::Gated
        && !config.query.is_empty()
    {
        return Err(CliError::QueryTooShort {
            query: config.query.clone(),
            min: MIN_QUERY_CHARS,
        });
    }
    if let SearchStatus::Error(err) = session.status() {
        return Err(err.into());
    }

    let listing = session.listing()?;
    if let Listing::Recent(_) = listing {
        write_line(writer, "recent places:")?;
    }
    let entries = listing.entries();
    for (position, entry) in entries.iter().enumerate() {
        write_line(
            writer,
            &format!(
                "{:>2}. {} ({})",
                position + 1,
                entry.description(),
                entry.place_id()
            ),
        )?;
    }

    let Some(choice) = config.choose else {
        return Ok(());
    };
    let candidate = choice
        .checked_sub(1)
        .and_then(|index| entries.get(index))
        .ok_or(CliError::InvalidChoice {
            choice,
            available: entries.len(),
        })?;
    info!("choosing {}", candidate.place_id());
    if let Some(chosen) = session.select(candidate).await?.applied() {
        write_json(
            writer,
            &ChosenReport {
                detail: &chosen.detail,
                region: chosen.region,
            },
        )?;
    }
    Ok(())
}

/// CLI arguments for the `details` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch the full record of a place by its provider \
                 identifier, resolving its first photo to a URL.",
    about = "Show place details"
)]
#[ortho_config(prefix = "GATEMAP")]
pub(crate) struct DetailsArgs {
    /// Provider identifier of the place.
    #[arg(value_name = "place-id")]
    #[serde(default)]
    pub(crate) place_id: Option<String>,
    /// API key for the places provider.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Endpoint root of the places provider.
    #[arg(long = ARG_PLACES_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) places_base_url: Option<String>,
}

/// Resolved `details` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DetailsConfig {
    pub(crate) place_id: String,
    pub(crate) places: PlacesConfig,
}

impl TryFrom<DetailsArgs> for DetailsConfig {
    type Error = CliError;

    fn try_from(args: DetailsArgs) -> Result<Self, Self::Error> {
        let place_id = args.place_id.ok_or(CliError::MissingArgument {
            field: ARG_PLACE_ID,
            env: ENV_DETAILS_PLACE_ID,
        })?;
        let places =
            PlacesConfig::resolve(args.api_key, args.places_base_url, ENV_DETAILS_API_KEY)?;
        Ok(Self { place_id, places })
    }
}

#[derive(Debug, Serialize)]
struct DetailsReport {
    detail: PlaceDetail,
    photo_url: Option<String>,
}

pub(crate) fn run_details(
    args: DetailsArgs,
    services: &dyn Services,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = DetailsConfig::try_from(merged)?;
    let provider = services.places(&config.places)?;

    let report = block_on(async {
        let detail = provider.details(&config.place_id).await?;
        let photo_url = match detail.photo_reference.as_deref() {
            Some(reference) => match provider.resolve_photo_url(reference).await {
                Ok(url) => Some(url),
                Err(PlacesError::PhotoUnavailable) => None,
                Err(err) => return Err(err),
            },
            None => None,
        };
        Ok::<_, PlacesError>(DetailsReport { detail, photo_url })
    })??;
    write_json(writer, &report)
}

#[cfg(test)]
pub(crate) fn search_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
