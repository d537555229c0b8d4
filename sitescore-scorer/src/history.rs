//! Historical scores used to warm the regional calibrator.
#![forbid(unsafe_code)]

use std::convert::Infallible;
use std::time::Duration;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default look-back window for historical scores.
pub const DEFAULT_HISTORY_WINDOW: Duration = Duration::from_secs(180 * 24 * 60 * 60);
/// Default cap on the number of rows read.
pub const DEFAULT_HISTORY_LIMIT: u32 = 5_000;

/// A previously computed score at a location.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoricalScore {
    /// Site location (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Final score recorded for the site.
    pub score: f64,
}

impl HistoricalScore {
    /// Pair a location with its recorded score.
    #[must_use]
    pub const fn new(location: Coord<f64>, score: f64) -> Self {
        Self { location, score }
    }
}

/// Which slice of history to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Only rows newer than this are returned.
    pub max_age: Duration,
    /// Maximum number of rows returned.
    pub limit: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_HISTORY_WINDOW,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Supplies historical scores for calibrator seeding.
pub trait HistorySource {
    /// Error raised when the history cannot be read.
    type Error;

    /// Load the records selected by `query`.
    ///
    /// # Errors
    /// Implementations return [`Self::Error`] when the backing store fails.
    fn load(&self, query: &HistoryQuery) -> Result<Vec<HistoricalScore>, Self::Error>;
}

/// In-memory history, useful for tests and replaying exported records.
///
/// Records carry no timestamps, so only [`HistoryQuery::limit`] applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryHistory {
    records: Vec<HistoricalScore>,
}

impl MemoryHistory {
    /// Wrap a list of records.
    #[must_use]
    pub const fn new(records: Vec<HistoricalScore>) -> Self {
        Self { records }
    }
}

impl HistorySource for MemoryHistory {
    type Error = Infallible;

    fn load(&self, query: &HistoryQuery) -> Result<Vec<HistoricalScore>, Self::Error> {
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(self.records.iter().copied().take(limit).collect())
    }
}

#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteHistory;

#[cfg(feature = "store-sqlite")]
mod sqlite {
    use std::time::{SystemTime, UNIX_EPOCH};

    use camino::Utf8Path;
    use geo::Coord;
    use rusqlite::Connection;

    use super::{HistoricalScore, HistoryQuery, HistorySource};
    use crate::error::HistoryError;

    /// Normalises `created_at` to Unix seconds so integer and text
    /// timestamps compare against the same cutoff.
    const CUTOFF_SELECTION_SQL: &str = "SELECT lat, lng, score FROM (
            SELECT lat, lng, score,
                CASE typeof(created_at)
                    WHEN 'text' THEN CAST(strftime('%s', created_at) AS INTEGER)
                    ELSE created_at
                END AS created_unix
            FROM analysis_results
        )
        WHERE created_unix >= ?1
        ORDER BY created_unix DESC
        LIMIT ?2";

    /// Reads scores from the `analysis_results` table of an `SQLite`
    /// database.
    ///
    /// The table must provide `lat`, `lng` and `score` columns plus a
    /// `created_at` column holding either Unix seconds or `SQLite` date-time
    /// text such as `2026-04-01 09:30:00`. Text that `SQLite` cannot parse as
    /// a date falls outside every window. Rows with a `NULL` in any of the
    /// three value columns are skipped.
    #[derive(Debug)]
    pub struct SqliteHistory {
        connection: Connection,
    }

    impl SqliteHistory {
        /// Open the database at `path`.
        ///
        /// # Errors
        /// Returns [`HistoryError::OpenDatabase`] when `SQLite` cannot open
        /// the file.
        pub fn open(path: &Utf8Path) -> Result<Self, HistoryError> {
            let connection = Connection::open(path.as_std_path()).map_err(|source| {
                HistoryError::OpenDatabase {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            Ok(Self { connection })
        }

        /// Wrap an already open connection.
        #[must_use]
        pub const fn from_connection(connection: Connection) -> Self {
            Self { connection }
        }

        fn cutoff(query: &HistoryQuery) -> Result<i64, HistoryError> {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|_| HistoryError::Clock)?;
            let elapsed = now.saturating_sub(query.max_age).as_secs();
            Ok(i64::try_from(elapsed).unwrap_or(i64::MAX))
        }
    }

    impl HistorySource for SqliteHistory {
        type Error = HistoryError;

        fn load(&self, query: &HistoryQuery) -> Result<Vec<HistoricalScore>, Self::Error> {
            let cutoff = Self::cutoff(query)?;
            let mut statement = self
                .connection
                .prepare(CUTOFF_SELECTION_SQL)
                .map_err(|source| HistoryError::Query {
                    operation: "prepare history selection",
                    source,
                })?;
            let rows = statement
                .query_map((cutoff, i64::from(query.limit)), |row| {
                    let lat: Option<f64> = row.get(0)?;
                    let lng: Option<f64> = row.get(1)?;
                    let score: Option<f64> = row.get(2)?;
                    Ok((lat, lng, score))
                })
                .map_err(|source| HistoryError::Query {
                    operation: "query history",
                    source,
                })?;

            let mut records = Vec::new();
            let mut incomplete = 0_usize;
            for row in rows {
                let values = row.map_err(|source| HistoryError::Query {
                    operation: "read history row",
                    source,
                })?;
                match values {
                    (Some(lat), Some(lng), Some(score)) => {
                        records.push(HistoricalScore::new(Coord { x: lng, y: lat }, score));
                    }
                    _ => incomplete = incomplete.saturating_add(1),
                }
            }
            if incomplete > 0 {
                log::warn!("Skipped {incomplete} history rows with missing values");
            }
            Ok(records)
        }
    }
}
