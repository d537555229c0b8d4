//! Area-level analysis on top of the point scorer.
//!
//! A [`SitePolygon`] is rasterised into at most [`GridConfig::max_cells`]
//! centroids, each centroid is scored with a [`CellStrategy`], and the
//! [`HeatmapEngine`] aggregates the cells into a [`HeatmapResult`] carrying the
//! optimal cell and variance-derived confidence. [`NationwideGrid`] runs the
//! same per-cell scoring over a fixed national grid fed by regional climate
//! estimates and caches the result per plant size.
//!
//! # Examples
//!
//! ```
//! use geo::Coord;
//! use sitescore_core::SiteMeasurements;
//! use sitescore_grid::{HeatmapEngine, SitePolygon};
//! use sitescore_scorer::SiteScorer;
//!
//! let field = SitePolygon::new(vec![
//!     Coord { x: 72.60, y: 23.00 },
//!     Coord { x: 72.62, y: 23.00 },
//!     Coord { x: 72.61, y: 23.02 },
//! ])?;
//! let site = SiteMeasurements::new(5.8, 3.5, 60.0).with_cloud_cover(25.0);
//! let heatmap = HeatmapEngine::new(SiteScorer::without_calibration()).compute(&field, &site, 100.0);
//! let best = heatmap.optimal_cell().expect("every heatmap has a cell");
//! assert!(heatmap.cells.iter().all(|cell| cell.score() <= best.score()));
//! # Ok::<(), sitescore_grid::GeometryError>(())
//! ```

#![forbid(unsafe_code)]

mod error;
mod heatmap;
pub mod nationwide;
mod polygon;
mod raster;
pub mod terrain;

pub use error::GeometryError;
pub use heatmap::{
    CellStrategy, GridCell, HeatmapEngine, HeatmapResult, OptimalCell, ScoreStatistics,
};
pub use nationwide::{NationwideCell, NationwideGrid, NationwideHeatmap, RegionalClimate};
pub use polygon::{EARTH_RADIUS_M, SitePolygon};
pub use raster::{GridConfig, GridPlan, METRES_PER_DEGREE_LAT, generate_grid, rasterise};
