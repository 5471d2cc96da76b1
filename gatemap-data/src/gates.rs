//! Static gate markers shown on the map.
//!
//! A built-in set ships with the crate; deployments may replace it with a
//! JSON file holding an array of `{"place_id": ..., "coords": {...}}`
//! objects.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use gatemap_core::{Coordinate, GateMarker};
use log::{debug, warn};
use thiserror::Error;

/// Built-in gates as `(place_id, latitude, longitude)`.
const DEFAULT_GATES: [(&str, f64, f64); 5] = [
    (
        "ChIJD-ON5V04HRURTUeqmfNG2vc",
        32.192_566_176_397_065,
        34.884_992_344_424_84,
    ),
    (
        "ChIJjWSOylcSHRURj2uBM4vs-LY",
        32.437_564_433_603_08,
        34.909_000_796_236_06,
    ),
    (
        "ChIJodmJ3-QSHRURgrG8tBcI0H0",
        32.443_379_515_312_29,
        34.895_491_093_155_556,
    ),
    (
        "ChIJu_9NFJ1LHRURqnCPWAarsj0",
        32.071_145_552_110_65,
        34.787_351_666_600_25,
    ),
    (
        "ChIJvW6B69Y2HRURBZdxAwOWV3k",
        32.096_750_363_038_34,
        34.942_846_353_804_754,
    ),
];

/// Errors raised while loading a gate file.
#[derive(Debug, Error)]
pub enum GateConfigError {
    /// The file could not be read.
    #[error("failed to read gate file {path}")]
    Read {
        /// Path of the gate file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a JSON array of gates with valid coordinates.
    #[error("failed to parse gate file {path}")]
    Parse {
        /// Path of the gate file.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Two gates share a place identifier.
    #[error("gate file {path} lists place {place_id} more than once")]
    DuplicatePlaceId {
        /// Path of the gate file.
        path: Utf8PathBuf,
        /// Repeated identifier.
        place_id: String,
    },
}

/// Return the built-in gate markers.
///
/// # Examples
///
/// ```
/// let gates = gatemap_data::default_gates();
/// assert_eq!(gates.len(), 5);
/// ```
#[must_use]
pub fn default_gates() -> Vec<GateMarker> {
    DEFAULT_GATES
        .iter()
        .filter_map(|&(place_id, latitude, longitude)| {
            match Coordinate::new(latitude, longitude) {
                Ok(coordinate) => Some(GateMarker::new(place_id, coordinate)),
                Err(err) => {
                    warn!("skipping built-in gate {place_id}: {err}");
                    None
                }
            }
        })
        .collect()
}

/// Load gate markers from a JSON file.
///
/// # Errors
///
/// Returns [`GateConfigError`] when the file is unreadable, malformed, or
/// repeats a place identifier.
pub fn load_gates(path: &Utf8Path) -> Result<Vec<GateMarker>, GateConfigError> {
    let contents = gatemap_fs::read_utf8_file(path).map_err(|source| GateConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let gates: Vec<GateMarker> =
        serde_json::from_str(&contents).map_err(|source| GateConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::new();
    if let Some(repeated) = gates.iter().find(|gate| !seen.insert(gate.place_id.as_str())) {
        return Err(GateConfigError::DuplicatePlaceId {
            path: path.to_path_buf(),
            place_id: repeated.place_id.clone(),
        });
    }

    debug!("loaded {} gates from {path}", gates.len());
    Ok(gates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_gate_file(contents: &str) -> (NamedTempFile, Utf8PathBuf) {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write gates");
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("utf-8 path");
        (file, path)
    }

    #[rstest]
    fn default_gates_have_unique_ids() {
        let gates = default_gates();
        let ids: HashSet<&str> = gates.iter().map(|gate| gate.place_id.as_str()).collect();

        assert_eq!(gates.len(), 5);
        assert_eq!(ids.len(), 5);
        assert!(ids.contains("ChIJu_9NFJ1LHRURqnCPWAarsj0"));
    }

    #[rstest]
    fn loads_gates_from_file() {
        let (_file, path) = write_gate_file(
            r#"[{"place_id": "gate-a", "coords": {"latitude": 32.1, "longitude": 34.8}}]"#,
        );

        let gates = load_gates(&path).expect("should load");

        assert_eq!(gates.len(), 1);
        assert_eq!(gates[0].place_id, "gate-a");
        assert_eq!(gates[0].coordinate.longitude(), 34.8);
    }

    #[rstest]
    #[case(r#"[{"place_id": "gate-a"}]"#)]
    #[case(r#"[{"place_id": "gate-a", "coords": {"latitude": 95.0, "longitude": 0.0}}]"#)]
    #[case("not json")]
    fn rejects_malformed_files(#[case] contents: &str) {
        let (_file, path) = write_gate_file(contents);

        let err = load_gates(&path).expect_err("should fail");

        assert!(matches!(err, GateConfigError::Parse { .. }));
    }

    #[rstest]
    fn rejects_duplicate_place_ids() {
        let (_file, path) = write_gate_file(
            r#"[
                {"place_id": "gate-a", "coords": {"latitude": 32.1, "longitude": 34.8}},
                {"place_id": "gate-a", "coords": {"latitude": 32.2, "longitude": 34.9}}
            ]"#,
        );

        let err = load_gates(&path).expect_err("should fail");

        assert!(matches!(
            err,
            GateConfigError::DuplicatePlaceId { ref place_id, .. } if place_id == "gate-a"
        ));
    }

    #[rstest]
    fn missing_file_is_a_read_error() {
        let err = load_gates(Utf8Path::new("/nonexistent/gates.json")).expect_err("should fail");

        assert!(matches!(err, GateConfigError::Read { .. }));
    }
}
