//! Facade crate for the sitescore solar site engine.
//!
//! This crate re-exports the scoring model, the calibrated scorer and the
//! area-level heatmap engine. The `SQLite` history adapter is available
//! behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use sitescore_core::{
    ConstraintCode, ConstraintViolation, Factor, FactorScores, Grade, RegionalStats, ScoreResult,
    SiteMeasurements, SuitabilityClass,
};

pub use sitescore_scorer::{
    CalibratorConfig, HistoricalScore, HistoryQuery, HistorySource, MemoryHistory, RegionKey,
    RegionalCalibrator, ScoreError, ScoreOptions, SiteScorer,
};

#[cfg(feature = "store-sqlite")]
pub use sitescore_scorer::{HistoryError, SqliteHistory};

pub use sitescore_grid::{
    CellStrategy, GeometryError, GridCell, GridConfig, HeatmapEngine, HeatmapResult,
    NationwideGrid, NationwideHeatmap, OptimalCell, SitePolygon,
};
