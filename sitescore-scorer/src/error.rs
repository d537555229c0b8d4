//! Error types raised while scoring sites or loading calibration history.
#![forbid(unsafe_code)]

#[cfg(feature = "store-sqlite")]
use camino::Utf8PathBuf;
use sitescore_core::ConstraintViolation;
use thiserror::Error;

/// Errors raised while scoring a site.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    /// The site location is not a finite WGS84 coordinate.
    #[error("site location (lat {lat}, lng {lng}) is not a valid WGS84 coordinate")]
    InvalidLocation {
        /// Supplied latitude.
        lat: f64,
        /// Supplied longitude.
        lng: f64,
    },
    /// At least one hard constraint was breached.
    #[error("site rejected by {} constraint(s): {}", violations.len(), summarise(violations))]
    Rejected {
        /// Every breached constraint, in evaluation order.
        violations: Vec<ConstraintViolation>,
    },
}

fn summarise(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|violation| violation.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while reading historical scores.
#[cfg(feature = "store-sqlite")]
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Opening the `SQLite` database failed.
    #[error("failed to open SQLite database at {path}")]
    OpenDatabase {
        /// Requested database path.
        path: Utf8PathBuf,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or executing a database query failed.
    #[error("failed to query {operation}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The system clock reads before the Unix epoch.
    #[error("system clock is before the Unix epoch")]
    Clock,
}
