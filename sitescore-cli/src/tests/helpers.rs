//! Test helpers for writing request files and history databases.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use sitescore_core::SiteMeasurements;
use tempfile::TempDir;

/// Central Delhi, inside the 25°N 75°E calibration region.
pub(super) const DELHI: Coord<f64> = Coord { x: 77.2, y: 28.6 };

/// A temporary directory addressed with UTF-8 paths.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write file");
}

pub(super) fn write_json(path: &Utf8Path, value: &serde_json::Value) {
    let payload = serde_json::to_vec_pretty(value).expect("serialise JSON");
    write_utf8(path, &payload);
}

/// A site that clears every constraint and grades A+.
pub(super) fn strong_site() -> SiteMeasurements {
    SiteMeasurements::new(5.5, 3.5, 600.0)
        .with_temperature(22.0)
        .with_cloud_cover(30.0)
        .with_slope(2.0)
        .with_grid_distance(5.0)
        .at(DELHI)
}

/// A site with too little sun to be viable.
pub(super) fn weak_site() -> SiteMeasurements {
    SiteMeasurements::new(1.5, 3.0, 250.0).at(DELHI)
}

/// Create an `analysis_results` table holding `count` recent scores at
/// `location`.
#[cfg(feature = "store-sqlite")]
pub(super) fn write_history(path: &Utf8Path, location: Coord<f64>, score: f64, count: usize) {
    use std::time::{SystemTime, UNIX_EPOCH};

    let connection = rusqlite::Connection::open(path.as_std_path()).expect("open history db");
    connection
        .execute(
            "CREATE TABLE analysis_results (
                lat REAL, lng REAL, score REAL, created_at INTEGER NOT NULL
            )",
            (),
        )
        .expect("create history table");
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs();
    let created_at = i64::try_from(now).expect("timestamp fits i64");
    for _ in 0..count {
        connection
            .execute(
                "INSERT INTO analysis_results (lat, lng, score, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                (location.y, location.x, score, created_at),
            )
            .expect("insert history row");
    }
}
