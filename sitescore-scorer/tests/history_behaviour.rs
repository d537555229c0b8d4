//! Behavioural coverage for seeding the calibrator from `SQLite` history.
#![cfg(feature = "store-sqlite")]

use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rusqlite::Connection;
use sitescore_scorer::{HistoryError, HistoryQuery, RegionalCalibrator, SqliteHistory};
use tempfile::TempDir;

const DAY_SECS: i64 = 24 * 60 * 60;

/// Temporary directory for each scenario.
#[fixture]
pub fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("create temporary directory: {err}"),
    }
}

/// Location of the history database under test.
#[fixture]
pub fn db_path() -> RefCell<Option<Utf8PathBuf>> {
    RefCell::new(None)
}

/// Calibrator receiving the seeded history.
#[fixture]
pub fn calibrator() -> RegionalCalibrator {
    RegionalCalibrator::default()
}

/// Outcome of seeding.
#[fixture]
pub fn seed_result() -> RefCell<Option<Result<usize, HistoryError>>> {
    RefCell::new(None)
}

#[expect(
    clippy::expect_used,
    reason = "fixture initialisation should fail fast when the database is unavailable"
)]
fn open_database(temp_dir: &TempDir, db_path: &RefCell<Option<Utf8PathBuf>>) -> Connection {
    let path =
        Utf8PathBuf::from_path_buf(temp_dir.path().join("history.db")).expect("utf8 path");
    let connection = Connection::open(path.as_std_path()).expect("open sqlite database");
    *db_path.borrow_mut() = Some(path);
    connection
}

#[expect(clippy::expect_used, reason = "test clock is after the epoch")]
fn now_secs() -> i64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch");
    i64::try_from(elapsed.as_secs()).expect("timestamp fits i64")
}

fn insert(connection: &Connection, lat: f64, lng: f64, score: Option<f64>, age_days: i64) {
    let created_at = now_secs() - age_days * DAY_SECS;
    connection
        .execute(
            "INSERT INTO analysis_results (lat, lng, score, created_at) VALUES (?1, ?2, ?3, ?4)",
            (lat, lng, score, created_at),
        )
        .unwrap_or_else(|err| panic!("insert analysis at {lat},{lng}: {err}"));
}

#[given("a history database with recent and stale analyses")]
#[expect(
    clippy::expect_used,
    reason = "schema setup should panic when the database is unavailable"
)]
fn history_database(temp_dir: &TempDir, db_path: &RefCell<Option<Utf8PathBuf>>) {
    let connection = open_database(temp_dir, db_path);
    connection
        .execute(
            "CREATE TABLE analysis_results (
                id INTEGER PRIMARY KEY,
                lat REAL,
                lng REAL,
                score INTEGER,
                created_at INTEGER NOT NULL
            )",
            [],
        )
        .expect("create analysis table");
    insert(&connection, 26.9, 75.8, Some(80.0), 1);
    insert(&connection, 26.8, 75.9, Some(85.0), 30);
    insert(&connection, 28.6, 77.2, Some(70.0), 90);
    insert(&connection, 28.6, 77.2, None, 2);
    insert(&connection, 19.0, 72.8, Some(60.0), 400);
}

#[given("a history database with text timestamps")]
#[expect(
    clippy::expect_used,
    reason = "schema setup should panic when the database is unavailable"
)]
fn text_timestamp_database(temp_dir: &TempDir, db_path: &RefCell<Option<Utf8PathBuf>>) {
    let connection = open_database(temp_dir, db_path);
    connection
        .execute(
            "CREATE TABLE analysis_results (
                lat REAL,
                lng REAL,
                score REAL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .expect("create analysis table");
    let rows = [
        (26.9, 75.8, 80.0, "-1 days"),
        (28.6, 77.2, 70.0, "-10 days"),
        (19.0, 72.8, 60.0, "-400 days"),
    ];
    for (lat, lng, score, age) in rows {
        connection
            .execute(
                "INSERT INTO analysis_results (lat, lng, score, created_at)
                 VALUES (?1, ?2, ?3, datetime('now', ?4))",
                (lat, lng, score, age),
            )
            .expect("insert text-dated analysis");
    }
    connection
        .execute(
            "INSERT INTO analysis_results (lat, lng, score, created_at)
             VALUES (12.9, 77.6, 75.0, 'not a date')",
            [],
        )
        .expect("insert undated analysis");
}

#[given("an empty history database")]
fn empty_database(temp_dir: &TempDir, db_path: &RefCell<Option<Utf8PathBuf>>) {
    let _connection = open_database(temp_dir, db_path);
}

#[when("the calibrator is seeded from the history database")]
fn seed(
    db_path: &RefCell<Option<Utf8PathBuf>>,
    calibrator: &RegionalCalibrator,
    seed_result: &RefCell<Option<Result<usize, HistoryError>>>,
) {
    let path = db_path
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("database path must be initialised"));
    let outcome = SqliteHistory::open(&path)
        .and_then(|history| calibrator.seed_from(&history, &HistoryQuery::default()));
    *seed_result.borrow_mut() = Some(outcome);
}

#[then("{count} historical scores are applied")]
fn applied(count: usize, seed_result: &RefCell<Option<Result<usize, HistoryError>>>) {
    match seed_result.borrow().as_ref() {
        Some(Ok(applied)) => assert_eq!(*applied, count),
        Some(Err(err)) => panic!("seeding should succeed, got {err}"),
        None => panic!("seeding must run first"),
    }
}

#[then("the calibrator tracks {regions} regions")]
fn tracks_regions(regions: usize, calibrator: &RegionalCalibrator) {
    assert_eq!(calibrator.len(), regions);
}

#[then("seeding fails with a query error")]
fn fails_with_query_error(seed_result: &RefCell<Option<Result<usize, HistoryError>>>) {
    match seed_result.borrow().as_ref() {
        Some(Err(HistoryError::Query { .. })) => {}
        Some(Err(other)) => panic!("unexpected error: {other}"),
        Some(Ok(applied)) => panic!("expected failure, applied {applied}"),
        None => panic!("seeding must run first"),
    }
}

#[scenario(path = "tests/features/history.feature", index = 0)]
fn recent_rows_seed_calibrator(
    temp_dir: TempDir,
    db_path: RefCell<Option<Utf8PathBuf>>,
    calibrator: RegionalCalibrator,
    seed_result: RefCell<Option<Result<usize, HistoryError>>>,
) {
    let _ = (temp_dir, db_path, calibrator, seed_result);
}

#[scenario(path = "tests/features/history.feature", index = 1)]
fn missing_table_fails(
    temp_dir: TempDir,
    db_path: RefCell<Option<Utf8PathBuf>>,
    calibrator: RegionalCalibrator,
    seed_result: RefCell<Option<Result<usize, HistoryError>>>,
) {
    let _ = (temp_dir, db_path, calibrator, seed_result);
}

#[scenario(path = "tests/features/history.feature", index = 2)]
fn text_timestamps_respect_window(
    temp_dir: TempDir,
    db_path: RefCell<Option<Utf8PathBuf>>,
    calibrator: RegionalCalibrator,
    seed_result: RefCell<Option<Result<usize, HistoryError>>>,
) {
    let _ = (temp_dir, db_path, calibrator, seed_result);
}
