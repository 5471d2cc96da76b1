//! Test doubles and fixtures shared by the CLI unit and behaviour tests.

use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use gatemap_core::test_support::MemoryRecencyStore;
use gatemap_core::{Coordinate, PlaceCandidate, PlaceDetail, PlacesProvider, RecencyStore};
use gatemap_data::places::test_support::StubPlacesProvider;
use crate::services::{PlacesConfig, Services};
use clap::Parser;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

/// Identifier of the built-in gate near Tel Aviv.
pub(super) const CITY_GATE: &str = "ChIJu_9NFJ1LHRURqnCPWAarsj0";

pub(super) fn city_gate_coordinate() -> Coordinate {
    Coordinate::new(32.071_145_552_110_65, 34.787_351_666_600_25).expect("valid coordinate")
}

/// Services handing out shared in-memory doubles and recording requests.
pub(super) struct StubServices {
    pub(super) places: Rc<StubPlacesProvider>,
    pub(super) recents: Rc<MemoryRecencyStore>,
    pub(super) places_configs: RefCell<Vec<PlacesConfig>>,
    pub(super) recents_paths: RefCell<Vec<Utf8PathBuf>>,
}

impl StubServices {
    pub(super) fn new(places: StubPlacesProvider) -> Self {
        Self::with_recents(places, MemoryRecencyStore::default())
    }

    pub(super) fn with_recents(places: StubPlacesProvider, recents: MemoryRecencyStore) -> Self {
        Self {
            places: Rc::new(places),
            recents: Rc::new(recents),
            places_configs: RefCell::new(Vec::new()),
            recents_paths: RefCell::new(Vec::new()),
        }
    }
}

impl Services for StubServices {
    fn places(&self, config: &PlacesConfig) -> Result<Rc<dyn PlacesProvider>, CliError> {
        self.places_configs.borrow_mut().push(config.clone());
        let places: Rc<dyn PlacesProvider> = self.places.clone();
        Ok(places)
    }

    fn recents(&self, path: &Utf8Path) -> Result<Rc<dyn RecencyStore>, CliError> {
        self.recents_paths.borrow_mut().push(path.to_path_buf());
        let recents: Rc<dyn RecencyStore> = self.recents.clone();
        Ok(recents)
    }
}

/// Provider answering "Starbucks" with two candidates and resolving the
/// first one, photo included.
pub(super) fn coffee_provider() -> StubPlacesProvider {
    let detail = PlaceDetail::new(
        "p1",
        "Starbucks",
        "1 Main St",
        Coordinate::new(32.08, 34.78).expect("valid coordinate"),
    )
    .with_photo_reference("photo-1");
    StubPlacesProvider::new()
        .with_candidates(
            "Starbucks",
            vec![
                PlaceCandidate::new("p1", "Starbucks, Main St"),
                PlaceCandidate::new("p2", "Starbucks, Harbour"),
            ],
        )
        .with_detail(detail)
        .with_photo_after("photo-1", "https://photos.test/1.jpg", Duration::ZERO)
}

/// Parse `argv` and run the command against `services`, returning the
/// outcome and everything written to stdout.
pub(super) fn run_cli(argv: &[&str], services: &StubServices) -> (Result<(), CliError>, String) {
    let mut stdout = Vec::new();
    let outcome = Cli::try_parse_from(argv.iter().copied())
        .map_err(CliError::from)
        .and_then(|cli| run_command(cli.command, services, &mut stdout));
    let printed = String::from_utf8(stdout).expect("stdout utf-8");
    (outcome, printed)
}

/// Extract the pretty-printed JSON document that ends the output.
pub(super) fn trailing_json(stdout: &str) -> serde_json::Value {
    let start = stdout.find('{').expect("output contains a JSON object");
    serde_json::from_str(&stdout[start..]).expect("trailing JSON")
}

/// Write `contents` into a fresh temporary directory.
pub(super) fn write_temp_file(name: &str, contents: &str) -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let path = root.join(name);
    std::fs::write(&path, contents).expect("write temp file");
    (dir, path)
}
