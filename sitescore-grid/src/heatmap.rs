//! Polygon heatmaps: rasterise, score every cell, aggregate.
#![forbid(unsafe_code)]

use std::cmp::Reverse;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sitescore_core::factor::{score_elevation, score_slope};
use sitescore_core::measurement::DEFAULT_SLOPE_DEG;
use sitescore_core::normalise::{clamp, clamp_unit, round_tenths};
use sitescore_core::result::raw_score;
use sitescore_core::{
    FactorScores, ResolvedMeasurements, ScoreParts, ScoreResult, SiteMeasurements,
    SuitabilityClass, check_constraints, score_factors,
};
use sitescore_scorer::{ScoreOptions, SiteScorer};

use crate::polygon::SitePolygon;
use crate::raster::{GridConfig, rasterise};
use crate::terrain::{TerrainSample, estimate_local, perturb};

/// Variance at which the confidence calibration bottoms out at 50.
const VARIANCE_FLOOR: f64 = 625.0;

/// How each grid cell is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CellStrategy {
    /// Score the polygon centroid once, then re-estimate only elevation and
    /// slope per cell. Cost is independent of the factor model.
    #[default]
    FastEstimate,
    /// Run the full composite for every cell with perturbed terrain.
    FullRecompute,
}

/// One scored cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GridCell {
    /// Cell centroid.
    pub location: Coord<f64>,
    /// Elevation used for the cell (m).
    pub elevation_m: f64,
    /// Slope used for the cell (degrees).
    pub slope_deg: f64,
    /// Display colour of the cell's suitability class.
    pub color: &'static str,
    /// Score of the cell.
    pub result: ScoreResult,
}

impl GridCell {
    const fn new(location: Coord<f64>, terrain: TerrainSample, result: ScoreResult) -> Self {
        Self {
            location,
            elevation_m: terrain.elevation_m,
            slope_deg: terrain.slope_deg,
            color: result.suitability.color(),
            result,
        }
    }

    /// Final score of the cell.
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.result.score
    }

    /// Suitability class of the cell.
    #[must_use]
    pub const fn suitability(&self) -> SuitabilityClass {
        self.result.suitability
    }
}

/// Mean, sample variance and standard deviation of cell scores.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScoreStatistics {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample variance; zero for fewer than two scores.
    pub variance: f64,
    /// Sample standard deviation; zero for fewer than two scores.
    pub std_dev: f64,
}

impl ScoreStatistics {
    /// Summarise a score list.
    ///
    /// # Examples
    /// ```
    /// use sitescore_grid::ScoreStatistics;
    ///
    /// let stats = ScoreStatistics::from_scores(&[70, 80, 90]);
    /// assert_eq!(stats.mean, 80.0);
    /// assert_eq!(stats.variance, 100.0);
    /// assert_eq!(stats.std_dev, 10.0);
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "moments of a capped score list"
    )]
    pub fn from_scores(scores: &[u8]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let count = scores.len() as f64;
        let mean = scores.iter().copied().map(f64::from).sum::<f64>() / count;
        if scores.len() < 2 {
            return Self {
                mean,
                ..Self::default()
            };
        }
        let squares: f64 = scores
            .iter()
            .map(|score| (f64::from(*score) - mean).powi(2))
            .sum();
        let variance = squares / (count - 1.0);
        Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// `clamp(0, 100, 100 − 2·σ)`, one decimal.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "linear penalty on spread")]
    pub fn spatial_confidence(&self) -> f64 {
        round_tenths(clamp(100.0 - 2.0 * self.std_dev, 0.0, 100.0))
    }

    /// `50 + 50·clamp(1 − variance/625)`, one decimal.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "variance is mapped onto 50..=100")]
    pub fn confidence_calibration(&self) -> f64 {
        round_tenths(50.0 + 50.0 * clamp_unit(1.0 - self.variance / VARIANCE_FLOOR))
    }
}

/// The best cell and why it was picked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OptimalCell {
    /// Cell centroid.
    pub location: Coord<f64>,
    /// Cell score.
    pub score: u8,
    /// Cell suitability class.
    pub suitability: SuitabilityClass,
    /// Human-readable justification.
    pub reason: String,
}

impl OptimalCell {
    fn from_cell(cell: &GridCell) -> Self {
        Self {
            location: cell.location,
            score: cell.score(),
            suitability: cell.suitability(),
            reason: format!(
                "Highest scoring sub-region: {}/100 ({}), elevation {:.0} m, slope {:.1}°",
                cell.score(),
                cell.suitability(),
                cell.elevation_m,
                cell.slope_deg,
            ),
        }
    }
}

/// Aggregated outcome of a polygon heatmap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HeatmapResult {
    /// Cells by score, best first; equal scores keep generation order.
    pub cells: Vec<GridCell>,
    /// The first entry of [`Self::cells`].
    pub optimal: Option<OptimalCell>,
    /// Score moments across cells.
    pub statistics: ScoreStatistics,
    /// Confidence in the optimal cell derived from score spread.
    pub spatial_confidence: f64,
    /// Variance-derived confidence, `50.0..=100.0`.
    pub confidence_calibration: f64,
    /// Effective cell size after auto-scaling (m).
    pub resolution_m: f64,
    /// Polygon area (m²), one decimal.
    pub polygon_area_m2: f64,
    /// Strategy that produced the cells.
    pub strategy: CellStrategy,
}

impl HeatmapResult {
    /// The highest-scoring cell.
    #[must_use]
    pub fn optimal_cell(&self) -> Option<&GridCell> {
        self.cells.first()
    }
}

/// Scores polygons cell by cell.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_core::SiteMeasurements;
/// use sitescore_grid::{CellStrategy, HeatmapEngine, SitePolygon};
/// use sitescore_scorer::SiteScorer;
///
/// let polygon = SitePolygon::new(vec![
///     Coord { x: 75.80, y: 26.90 },
///     Coord { x: 75.81, y: 26.90 },
///     Coord { x: 75.81, y: 26.91 },
///     Coord { x: 75.80, y: 26.91 },
/// ])?;
/// let site = SiteMeasurements::new(5.6, 4.0, 350.0);
/// let engine = HeatmapEngine::new(SiteScorer::without_calibration())
///     .with_strategy(CellStrategy::FullRecompute);
/// let heatmap = engine.compute(&polygon, &site, 100.0);
/// assert!(!heatmap.cells.is_empty());
/// assert!(heatmap.cells.len() <= 200);
/// # Ok::<(), sitescore_grid::GeometryError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeatmapEngine {
    scorer: SiteScorer,
    config: GridConfig,
    strategy: CellStrategy,
}

impl HeatmapEngine {
    /// Engine with the default grid configuration and the fast strategy.
    #[must_use]
    pub fn new(scorer: SiteScorer) -> Self {
        Self {
            scorer,
            config: GridConfig::default(),
            strategy: CellStrategy::default(),
        }
    }

    /// Replace the grid configuration.
    #[must_use]
    pub const fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the per-cell strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: CellStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Active grid configuration.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Active strategy.
    #[must_use]
    pub const fn strategy(&self) -> CellStrategy {
        self.strategy
    }

    /// Rasterise `polygon`, score each cell from `site` and aggregate.
    ///
    /// Cells never feed the regional calibrator.
    #[must_use]
    pub fn compute(
        &self,
        polygon: &SitePolygon,
        site: &SiteMeasurements,
        cell_size_m: f64,
    ) -> HeatmapResult {
        let plan = rasterise(polygon, cell_size_m, &self.config);
        let mut cells = match self.strategy {
            CellStrategy::FullRecompute => self.full_recompute(&plan.centroids, site),
            CellStrategy::FastEstimate => {
                self.fast_estimate(&plan.centroids, site, polygon.centroid())
            }
        };
        cells.sort_by_key(|cell| Reverse(cell.score()));

        let scores: Vec<u8> = cells.iter().map(GridCell::score).collect();
        let statistics = ScoreStatistics::from_scores(&scores);
        let optimal = cells.first().map(OptimalCell::from_cell);
        let result = HeatmapResult {
            optimal,
            statistics,
            spatial_confidence: statistics.spatial_confidence(),
            confidence_calibration: statistics.confidence_calibration(),
            resolution_m: round_tenths(plan.resolution_m),
            polygon_area_m2: round_tenths(polygon.area_m2()),
            strategy: self.strategy,
            cells,
        };
        log::info!(
            "heatmap: {} cells, mean={:.1} sd={:.1} spatial_conf={} best={:?}",
            result.cells.len(),
            statistics.mean,
            statistics.std_dev,
            result.spatial_confidence,
            result.optimal.as_ref().map(|cell| cell.score),
        );
        result
    }

    fn full_recompute(&self, centroids: &[Coord<f64>], site: &SiteMeasurements) -> Vec<GridCell> {
        let base = TerrainSample {
            elevation_m: site.elevation_m,
            slope_deg: site.slope_deg.unwrap_or(DEFAULT_SLOPE_DEG),
        };
        centroids
            .iter()
            .map(|&location| {
                let terrain = perturb(base, location);
                let cell_site = SiteMeasurements {
                    location: Some(location),
                    elevation_m: terrain.elevation_m,
                    slope_deg: Some(terrain.slope_deg),
                    ..*site
                };
                let resolved = cell_site.resolve();
                let result = self.scorer.evaluate(
                    &resolved,
                    check_constraints(&resolved),
                    ScoreOptions::uncalibrated(),
                );
                GridCell::new(location, terrain, result)
            })
            .collect()
    }

    fn fast_estimate(
        &self,
        centroids: &[Coord<f64>],
        site: &SiteMeasurements,
        anchor: Coord<f64>,
    ) -> Vec<GridCell> {
        let base = SiteMeasurements {
            location: Some(anchor),
            ..*site
        }
        .resolve();
        let base_result = self.scorer.evaluate(
            &base,
            check_constraints(&base),
            ScoreOptions::uncalibrated(),
        );
        let base_factors = score_factors(&base);
        let base_terrain = TerrainSample {
            elevation_m: base.elevation_m,
            slope_deg: base.slope_deg,
        };
        log::debug!(
            "fast estimate anchored at {:.5},{:.5}: base score {}",
            anchor.y,
            anchor.x,
            base_result.score
        );

        centroids
            .iter()
            .map(|&location| {
                let terrain = estimate_local(base_terrain, location);
                let result = score_local(
                    &base,
                    &base_factors,
                    base_result.confidence,
                    location,
                    terrain,
                );
                GridCell::new(location, terrain, result)
            })
            .collect()
    }
}

/// Re-score a cell with only the terrain factors recomputed.
fn score_local(
    base: &ResolvedMeasurements,
    base_factors: &FactorScores,
    confidence: f64,
    location: Coord<f64>,
    terrain: TerrainSample,
) -> ScoreResult {
    let cell = ResolvedMeasurements {
        location: Some(location),
        elevation_m: terrain.elevation_m,
        slope_deg: terrain.slope_deg,
        ..*base
    };
    let factors = FactorScores {
        elevation: score_elevation(terrain.elevation_m),
        slope: score_slope(terrain.slope_deg),
        ..*base_factors
    };
    ScoreResult::assemble(ScoreParts {
        raw_score: raw_score(factors.weighted_sum()),
        adjustment: 0.0,
        confidence,
        factors,
        violations: check_constraints(&cell).violations,
        regional_stats: None,
    })
}
