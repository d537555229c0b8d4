//! Pre-computed national heatmap for India built from regional climate
//! estimates instead of live measurements.
#![forbid(unsafe_code)]

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use geo::Coord;
#[cfg(feature = "serde")]
use serde::Serialize;
use sitescore_core::measurement::DEFAULT_PLANT_CAPACITY_KW;
use sitescore_core::normalise::{round_hundredths, round_tenths};
use sitescore_core::{ConstraintReport, Grade, SiteMeasurements, SuitabilityClass};
use sitescore_scorer::{ScoreOptions, SiteScorer};

use crate::heatmap::ScoreStatistics;

/// Southern edge of the national grid.
pub const LAT_MIN: f64 = 6.5;
/// Northern edge of the national grid.
pub const LAT_MAX: f64 = 37.5;
/// Western edge of the national grid.
pub const LNG_MIN: f64 = 67.0;
/// Eastern edge of the national grid.
pub const LNG_MAX: f64 = 97.5;
/// Grid spacing in degrees, about 83 km.
pub const GRID_STEP_DEG: f64 = 0.75;

/// Regions reported when none of the top cells fall in a known state box.
const FALLBACK_REGIONS: [&str; 3] = ["Rajasthan", "Gujarat", "Andhra Pradesh"];

/// Cells inspected when naming top regions.
const TOP_CELL_COUNT: usize = 5;

const NOTE: &str =
    "National heatmap uses estimated climate data; run a point analysis for precise site scoring";

/// Approximate state extents as `(name, lat_min, lat_max, lng_min, lng_max)`.
const STATE_BOXES: [(&str, f64, f64, f64, f64); 10] = [
    ("Rajasthan", 22.0, 30.0, 68.0, 78.0),
    ("Gujarat", 20.0, 25.0, 68.0, 74.0),
    ("Maharashtra", 15.0, 23.0, 72.0, 81.0),
    ("Andhra Pradesh", 12.0, 20.0, 76.0, 85.0),
    ("Karnataka", 12.0, 19.0, 74.0, 78.0),
    ("Tamil Nadu", 8.0, 14.0, 76.0, 80.0),
    ("Madhya Pradesh", 21.0, 27.0, 74.0, 82.0),
    ("Telangana", 15.0, 19.0, 77.0, 82.0),
    ("Punjab", 29.0, 33.0, 73.0, 77.0),
    ("Haryana", 27.0, 31.0, 74.0, 78.0),
];

/// Climate estimate for one national grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionalClimate {
    /// Mean irradiance (kWh/m²/day).
    pub solar_irradiance: f64,
    /// Mean annual temperature (°C).
    pub temperature_c: f64,
    /// Mean cloud cover (%).
    pub cloud_cover_pct: f64,
    /// Mean wind speed (m/s).
    pub wind_speed: f64,
    /// Typical elevation (m).
    pub elevation_m: f64,
    /// Typical distance to the grid (km).
    pub grid_distance_km: f64,
}

impl RegionalClimate {
    /// Look up the banded estimates for a point.
    #[must_use]
    pub fn estimate(at: Coord<f64>) -> Self {
        let (lat, lng) = (at.y, at.x);
        Self {
            solar_irradiance: estimate_solar(lat, lng),
            temperature_c: estimate_temperature(lat),
            cloud_cover_pct: estimate_cloud(lat, lng),
            wind_speed: estimate_wind(lat, lng),
            elevation_m: estimate_elevation(lat, lng),
            grid_distance_km: estimate_grid_distance(lat, lng),
        }
    }

    const fn measurements(&self, at: Coord<f64>, plant_size_kw: f64) -> SiteMeasurements {
        SiteMeasurements::new(self.solar_irradiance, self.wind_speed, self.elevation_m)
            .at(at)
            .with_temperature(self.temperature_c)
            .with_humidity(55.0)
            .with_cloud_cover(self.cloud_cover_pct)
            .with_slope(1.5)
            .with_grid_distance(self.grid_distance_km)
            .with_plant_capacity(plant_size_kw)
    }
}

fn within(value: f64, lo: f64, hi: f64) -> bool {
    (lo..=hi).contains(&value)
}

#[expect(clippy::float_arithmetic, reason = "irradiance bands carry gradients")]
fn estimate_solar(lat: f64, lng: f64) -> f64 {
    if within(lat, 22.0, 32.0) && within(lng, 68.0, 77.0) {
        6.2 + (27.0 - lat) * 0.05
    } else if within(lat, 26.0, 32.0) && within(lng, 74.0, 84.0) {
        5.8
    } else if within(lat, 18.0, 26.0) && within(lng, 74.0, 84.0) {
        5.9 - (lat - 22.0).abs() * 0.05
    } else if within(lat, 13.0, 20.0) && within(lng, 74.0, 84.0) {
        5.8
    } else if within(lat, 8.0, 13.0) && within(lng, 76.0, 80.0) {
        5.7
    } else if within(lat, 8.0, 12.0) && within(lng, 75.0, 77.0) {
        5.0
    } else if lat >= 22.0 && lng >= 88.0 {
        4.6 - (lat - 22.0) * 0.05
    } else if lat >= 32.0 && within(lng, 74.0, 83.0) {
        5.7 + (lat - 32.0) * 0.1
    } else if within(lat, 18.0, 24.0) && within(lng, 84.0, 90.0) {
        5.3
    } else {
        5.0 + (1.0 - (lat - 20.0).abs() / 20.0).max(0.0) * 0.8
    }
}

#[expect(clippy::float_arithmetic, reason = "the northern band has a gradient")]
const fn estimate_temperature(lat: f64) -> f64 {
    if lat >= 32.0 {
        14.0 + (37.0 - lat) * 0.5
    } else if lat >= 28.0 {
        24.0
    } else if lat >= 22.0 {
        27.0
    } else if lat >= 15.0 {
        28.0
    } else {
        27.5
    }
}

fn estimate_cloud(lat: f64, lng: f64) -> f64 {
    if within(lng, 74.0, 77.0) && lat <= 12.0 {
        55.0
    } else if lng >= 88.0 && lat >= 22.0 {
        60.0
    } else if within(lat, 14.0, 20.0) && within(lng, 73.0, 77.0) {
        40.0
    } else if within(lat, 22.0, 30.0) && within(lng, 68.0, 77.0) {
        20.0
    } else {
        35.0
    }
}

fn estimate_wind(lat: f64, lng: f64) -> f64 {
    if within(lat, 22.0, 30.0) && within(lng, 68.0, 77.0) {
        4.5
    } else if within(lat, 8.0, 13.0) && within(lng, 76.0, 80.0) {
        4.0
    } else {
        3.0
    }
}

fn estimate_elevation(lat: f64, lng: f64) -> f64 {
    if lat >= 34.0 {
        2_500.0
    } else if lat >= 32.0 {
        1_200.0
    } else if within(lat, 22.0, 30.0) && within(lng, 68.0, 75.0) {
        300.0
    } else if within(lat, 18.0, 22.0) && within(lng, 74.0, 78.0) {
        600.0
    } else if within(lat, 10.0, 15.0) && within(lng, 75.0, 79.0) {
        400.0
    } else {
        200.0
    }
}

fn estimate_grid_distance(lat: f64, lng: f64) -> f64 {
    if lat >= 32.0 {
        25.0
    } else if lng >= 92.0 && lat >= 22.0 {
        30.0
    } else if within(lat, 22.0, 30.0) && within(lng, 68.0, 74.0) {
        15.0
    } else {
        8.0
    }
}

/// Coarse land test: the national box minus open sea and neighbouring
/// countries.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_grid::nationwide::is_within_india;
///
/// assert!(is_within_india(Coord { x: 75.8, y: 26.9 }));
/// assert!(!is_within_india(Coord { x: 92.0, y: 12.0 }));
/// ```
#[must_use]
pub fn is_within_india(at: Coord<f64>) -> bool {
    let (lat, lng) = (at.y, at.x);
    if !within(lat, 8.0, 37.0) || !within(lng, 67.0, 98.0) {
        return false;
    }
    if lat < 20.0 && lng > 90.0 {
        return false;
    }
    if lat < 15.0 && !within(lng, 73.0, 83.0) {
        return false;
    }
    !(lat > 33.0 && !within(lng, 73.0, 85.0))
}

/// State whose box contains `at`, first match wins.
#[must_use]
pub fn state_for(at: Coord<f64>) -> Option<&'static str> {
    STATE_BOXES
        .iter()
        .find(|(_, lat_min, lat_max, lng_min, lng_max)| {
            within(at.y, *lat_min, *lat_max) && within(at.x, *lng_min, *lng_max)
        })
        .map(|(name, ..)| *name)
}

/// One scored national grid point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NationwideCell {
    /// Grid point.
    pub location: Coord<f64>,
    /// Final score.
    pub score: u8,
    /// Letter grade.
    pub grade: Grade,
    /// Suitability class.
    pub suitability: SuitabilityClass,
    /// Display colour.
    pub color: &'static str,
    /// Estimated irradiance, two decimals.
    pub solar_irradiance: f64,
}

/// National heatmap for one plant size.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NationwideHeatmap {
    /// Cells by score, best first.
    pub cells: Vec<NationwideCell>,
    /// Grid spacing in degrees.
    pub grid_resolution_deg: f64,
    /// Mean cell score, one decimal.
    pub score_mean: f64,
    /// Score moments across cells.
    pub statistics: ScoreStatistics,
    /// Confidence in the optimal cell derived from score spread.
    pub spatial_confidence: f64,
    /// Variance-derived confidence, `50.0..=100.0`.
    pub confidence_calibration: f64,
    /// The five best cells.
    pub top_cells: Vec<NationwideCell>,
    /// States holding the best cells.
    pub top_regions: Vec<&'static str>,
    /// Plant size the grid was scored for (kW).
    pub plant_size_kw: f64,
    /// Caveat shown alongside the map.
    pub note: &'static str,
}

impl NationwideHeatmap {
    /// The highest-scoring cell.
    #[must_use]
    pub fn optimal_cell(&self) -> Option<&NationwideCell> {
        self.cells.first()
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Computes and caches national heatmaps per plant size.
///
/// The cache lives as long as the grid value; there is no eviction.
#[derive(Debug, Default)]
pub struct NationwideGrid {
    cache: Mutex<HashMap<u64, Arc<NationwideHeatmap>>>,
}

impl NationwideGrid {
    /// Create an empty grid cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Heatmap for `plant_size_kw`, computed on first request.
    ///
    /// Non-finite or non-positive sizes fall back to the default plant
    /// capacity.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use sitescore_grid::NationwideGrid;
    ///
    /// let grid = NationwideGrid::new();
    /// let first = grid.compute(10.0);
    /// assert!(first.cell_count() > 500);
    /// assert!(Arc::ptr_eq(&first, &grid.compute(10.0)));
    /// ```
    #[must_use]
    pub fn compute(&self, plant_size_kw: f64) -> Arc<NationwideHeatmap> {
        let size_kw = sanitize_plant_size(plant_size_kw);
        let key = size_kw.to_bits();
        if let Some(cached) = self.cache().get(&key) {
            log::debug!("nationwide heatmap for {size_kw} kW served from cache");
            return Arc::clone(cached);
        }
        let computed = Arc::new(build(size_kw));
        Arc::clone(self.cache().entry(key).or_insert(computed))
    }

    /// Number of cached plant sizes.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<u64, Arc<NationwideHeatmap>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sanitize_plant_size(plant_size_kw: f64) -> f64 {
    if plant_size_kw.is_finite() && plant_size_kw > 0.0 {
        plant_size_kw
    } else {
        log::warn!("plant size {plant_size_kw} kW is unusable; using {DEFAULT_PLANT_CAPACITY_KW}");
        DEFAULT_PLANT_CAPACITY_KW
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "grid points are offsets from the south-west corner"
)]
fn build(plant_size_kw: f64) -> NationwideHeatmap {
    log::info!("computing nationwide grid at {GRID_STEP_DEG}° for {plant_size_kw} kW");
    let scorer = SiteScorer::without_calibration();
    let options = ScoreOptions {
        apply_calibration: false,
        run_constraints: false,
        data_sources: 3,
    };
    let rows = axis_points(LAT_MIN, LAT_MAX);
    let columns = axis_points(LNG_MIN, LNG_MAX);

    let mut cells = Vec::new();
    for row in 0..rows {
        for column in 0..columns {
            let at = Coord {
                x: LNG_MIN + column as f64 * GRID_STEP_DEG,
                y: LAT_MIN + row as f64 * GRID_STEP_DEG,
            };
            if !is_within_india(at) {
                continue;
            }
            let climate = RegionalClimate::estimate(at);
            let site = climate.measurements(at, plant_size_kw).resolve();
            let result = scorer.evaluate(&site, ConstraintReport::default(), options);
            cells.push(NationwideCell {
                location: at,
                score: result.score,
                grade: result.grade,
                suitability: result.suitability,
                color: result.suitability.color(),
                solar_irradiance: round_hundredths(climate.solar_irradiance),
            });
        }
    }
    cells.sort_by_key(|cell| Reverse(cell.score));

    let scores: Vec<u8> = cells.iter().map(|cell| cell.score).collect();
    let statistics = ScoreStatistics::from_scores(&scores);
    let top_cells: Vec<NationwideCell> = cells.iter().take(TOP_CELL_COUNT).cloned().collect();
    let regions = top_regions(&top_cells);
    log::info!(
        "nationwide grid: {} cells, mean score {:.1} sd={:.1}",
        cells.len(),
        statistics.mean,
        statistics.std_dev,
    );
    NationwideHeatmap {
        cells,
        grid_resolution_deg: GRID_STEP_DEG,
        score_mean: round_tenths(statistics.mean),
        statistics,
        spatial_confidence: statistics.spatial_confidence(),
        confidence_calibration: statistics.confidence_calibration(),
        top_cells,
        top_regions: regions,
        plant_size_kw,
        note: NOTE,
    }
}

/// Grid points along one axis, including both ends when they align.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the span is a small positive constant"
)]
fn axis_points(min: f64, max: f64) -> usize {
    ((max - min) / GRID_STEP_DEG).floor() as usize + 1
}

fn top_regions(top_cells: &[NationwideCell]) -> Vec<&'static str> {
    let mut named: Vec<&'static str> = Vec::new();
    for state in top_cells.iter().filter_map(|cell| state_for(cell.location)) {
        if !named.contains(&state) {
            named.push(state);
        }
    }
    if named.is_empty() {
        FALLBACK_REGIONS.to_vec()
    } else {
        named
    }
}
