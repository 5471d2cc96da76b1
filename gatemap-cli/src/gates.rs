//! `gates` command implementation.

use std::io::Write;
use std::rc::Rc;

use camino::Utf8PathBuf;
use clap::Parser;
use gatemap_core::{
    Coordinate, GateMarker, PlaceCandidate, PlaceDetail, RecencyError, RecencyStore, Region,
};
use gatemap_data::{FixedPositionProvider, default_gates, load_gates};
use gatemap_session::{Loadable, MapInteractionController, MapSettings};
use log::{debug, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::services::{PlacesConfig, Services};
use crate::{
    ARG_API_KEY, ARG_GATES_FILE, ARG_LATITUDE, ARG_LONGITUDE, ARG_PLACES_BASE_URL, CliError,
    ENV_GATES_API_KEY, block_on, write_json, write_line,
};

/// CLI arguments for the `gates` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List the gate markers. Given a position the map is centred \
                 there and only the markers in view are listed. --tap opens \
                 the detail overlay of one marker and prints what it shows.",
    about = "List gate markers"
)]
#[ortho_config(prefix = "GATEMAP")]
pub(crate) struct GatesArgs {
    /// JSON file of gate markers; the built-in gates are used when absent.
    #[arg(long = ARG_GATES_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) gates_file: Option<Utf8PathBuf>,
    /// Latitude of the position to centre on.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the position to centre on.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Span in degrees of the region shown around the position.
    #[arg(long, value_name = "degrees")]
    #[serde(default)]
    pub(crate) region_delta: Option<f64>,
    /// Tap the marker with this place identifier.
    #[arg(long, value_name = "place-id")]
    #[serde(default)]
    pub(crate) tap: Option<String>,
    /// API key for the places provider; required with --tap.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Endpoint root of the places provider.
    #[arg(long = ARG_PLACES_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) places_base_url: Option<String>,
}

/// Resolved `gates` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GatesConfig {
    pub(crate) gates_file: Option<Utf8PathBuf>,
    pub(crate) centre: Option<Coordinate>,
    pub(crate) settings: MapSettings,
    pub(crate) tap: Option<String>,
    pub(crate) places: PlacesConfig,
}

impl TryFrom<GatesArgs> for GatesConfig {
    type Error = CliError;

    fn try_from(args: GatesArgs) -> Result<Self, Self::Error> {
        let centre = match (args.latitude, args.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)?),
            (None, None) => None,
            _ => return Err(CliError::IncompleteCoordinate),
        };
        let places = if args.tap.is_some() {
            PlacesConfig::resolve(args.api_key, args.places_base_url, ENV_GATES_API_KEY)?
        } else {
            // Never contacted: only a tap reaches the provider.
            PlacesConfig::without_key(args.places_base_url)
        };
        let mut settings = MapSettings::default();
        if let Some(delta) = args.region_delta {
            settings.region_delta = delta;
        }
        Ok(Self {
            gates_file: args.gates_file,
            centre,
            settings,
            tap: args.tap,
            places,
        })
    }
}

/// Recency store for a map whose search overlay is never opened. Nothing is
/// read or written, so listing gates leaves no database behind.
#[derive(Debug)]
struct NoRecents;

impl RecencyStore for NoRecents {
    fn insert(&self, _candidate: &PlaceCandidate) -> Result<bool, RecencyError> {
        Ok(false)
    }

    fn list(&self) -> Result<Vec<PlaceCandidate>, RecencyError> {
        Ok(Vec::new())
    }

    fn clear(&self) -> Result<(), RecencyError> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct TapReport<'a> {
    place_id: &'a str,
    coordinate: Coordinate,
    detail: Option<&'a PlaceDetail>,
    photo_url: Option<&'a str>,
}

pub(crate) fn run_gates(
    args: GatesArgs,
    services: &dyn Services,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = GatesConfig::try_from(merged)?;

    let markers = match &config.gates_file {
        Some(path) => load_gates(path)?,
        None => default_gates(),
    };
    let origin = match config
        .centre
        .or_else(|| markers.first().map(|marker| marker.coordinate))
    {
        Some(origin) => origin,
        None => Coordinate::new(0.0, 0.0)?,
    };
    let map = MapInteractionController::new(
        services.places(&config.places)?,
        Rc::new(NoRecents),
        Rc::new(FixedPositionProvider::new(config.centre)),
        markers,
        Region::centered_on(origin),
    )
    .with_settings(config.settings)?;

    block_on(gates_with(&map, &config, writer))?
}

async fn gates_with(
    map: &MapInteractionController,
    config: &GatesConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let listed: Vec<&GateMarker> = if config.centre.is_some() {
        if let Some(animation) = map.center_on_user().await?.applied() {
            debug!("camera moving to {:?}", animation.target);
            map.finish_animation(animation.token);
        }
        map.visible_markers()
    } else {
        map.markers().iter().collect()
    };
    for marker in listed {
        write_line(
            writer,
            &format!(
                "{}\t{:.6},{:.6}",
                marker.place_id,
                marker.coordinate.latitude(),
                marker.coordinate.longitude()
            ),
        )?;
    }

    let Some(place_id) = config.tap.as_deref() else {
        return Ok(());
    };
    info!("tapping marker {place_id}");
    if let Some(view) = map.tap_marker(place_id).await?.applied() {
        let detail = match &view.detail {
            Loadable::Ready(detail) => Some(detail),
            Loadable::Loading | Loadable::Missing | Loadable::Failed(_) => None,
        };
        let photo_url = match &view.photo_url {
            Loadable::Ready(url) => Some(url.as_str()),
            Loadable::Loading | Loadable::Missing | Loadable::Failed(_) => None,
        };
        write_json(
            writer,
            &TapReport {
                place_id: &view.marker.place_id,
                coordinate: view.marker.coordinate,
                detail,
                photo_url,
            },
        )?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn gates_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<GatesConfig, CliError> {
    let merged = GatesArgs::merge_from_layers(layers).map_err(CliError::from)?;
    GatesConfig::try_from(merged)
}
