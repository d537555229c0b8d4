//! Site scoring with adaptive regional calibration.
//!
//! The crate combines the pure model from `sitescore-core` with the one piece
//! of shared state in the engine:
//! - **Regional calibration** learns per 5° × 5° region how observed scores
//!   drift from the neutral baseline and nudges new scores by a bounded
//!   amount. The [`RegionalCalibrator`] is owned by the caller and injected
//!   into every [`SiteScorer`].
//! - **Composite scoring** resolves defaults, runs the constraint filter,
//!   weights the eight factors and bands the result.
//! - **History seeding** warms the calibrator from previously stored scores
//!   through the [`HistorySource`] trait; the `store-sqlite` feature adds an
//!   `SQLite` adapter.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use geo::Coord;
//! use sitescore_core::SiteMeasurements;
//! use sitescore_scorer::{RegionalCalibrator, ScoreOptions, SiteScorer};
//!
//! let calibrator = Arc::new(RegionalCalibrator::default());
//! let scorer = SiteScorer::new(Arc::clone(&calibrator));
//! let site = SiteMeasurements::new(1.5, 3.0, 250.0).at(Coord { x: 77.2, y: 28.6 });
//! let result = scorer.score(&site, ScoreOptions::default())?;
//! assert!(!result.is_suitable);
//! assert_eq!(calibrator.len(), 1);
//! # Ok::<(), sitescore_scorer::ScoreError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod calibrator;
mod composite;
mod error;
mod history;
mod region;

pub use calibrator::{CalibratorConfig, RegionalCalibrator};
pub use composite::{ScoreOptions, SiteScorer};
#[cfg(feature = "store-sqlite")]
pub use error::HistoryError;
pub use error::ScoreError;
#[cfg(feature = "store-sqlite")]
pub use history::SqliteHistory;
pub use history::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_HISTORY_WINDOW, HistoricalScore, HistoryQuery, HistorySource,
    MemoryHistory,
};
pub use region::{REGION_SIZE_DEG, RegionKey, is_valid_coordinate};
