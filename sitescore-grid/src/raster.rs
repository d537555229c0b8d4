//! Rasterisation of site polygons into cell centroids.
#![forbid(unsafe_code)]

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::polygon::SitePolygon;

/// Metres spanned by one degree of latitude.
pub const METRES_PER_DEGREE_LAT: f64 = 111_320.0;

/// Smallest cosine used when scaling longitude steps near the poles.
const MIN_LATITUDE_COSINE: f64 = 0.01;

/// Upper bound on coarsening rounds before the centroid list is truncated.
const MAX_COARSEN_ROUNDS: u32 = 16;

/// Growth applied on top of the ideal coarsening ratio so each round makes
/// progress even when rounding keeps the count just above the cap.
const COARSEN_MARGIN: f64 = 1.05;

/// Tuning for polygon rasterisation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Maximum number of cells a polygon may produce.
    pub max_cells: usize,
    /// Cell size used when the caller passes an unusable value (m).
    pub default_cell_m: f64,
    /// Smallest accepted cell size (m).
    pub min_cell_m: f64,
    /// Largest accepted cell size (m).
    pub max_cell_m: f64,
    /// Maximum bounding-box points examined in one scan.
    pub max_scan_points: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_cells: 200,
            default_cell_m: 100.0,
            min_cell_m: 10.0,
            max_cell_m: 1_000.0,
            max_scan_points: 100_000,
        }
    }
}

impl GridConfig {
    /// Map a requested cell size onto the accepted range.
    ///
    /// Non-finite and non-positive sizes fall back to
    /// [`GridConfig::default_cell_m`]; everything else is clamped to
    /// `[min_cell_m, max_cell_m]`.
    ///
    /// # Examples
    /// ```
    /// use sitescore_grid::GridConfig;
    ///
    /// let config = GridConfig::default();
    /// assert_eq!(config.sanitize_cell_size(f64::NAN), 100.0);
    /// assert_eq!(config.sanitize_cell_size(2.0), 10.0);
    /// assert_eq!(config.sanitize_cell_size(250.0), 250.0);
    /// ```
    #[must_use]
    pub fn sanitize_cell_size(&self, cell_m: f64) -> f64 {
        if !cell_m.is_finite() || cell_m <= 0.0 {
            return self.default_cell_m;
        }
        cell_m.clamp(self.min_cell_m, self.max_cell_m)
    }
}

/// Cell centroids generated for a polygon and the resolution that produced
/// them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GridPlan {
    /// Cell centroids in generation order (south to north, west to east).
    pub centroids: Vec<Coord<f64>>,
    /// Effective cell size after auto-scaling (m).
    pub resolution_m: f64,
}

/// Degree steps for a metric cell size at a given latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Steps {
    lat: f64,
    lng: f64,
}

impl Steps {
    #[expect(clippy::float_arithmetic, reason = "metres are converted to degrees")]
    fn for_resolution(resolution_m: f64, latitude: f64) -> Self {
        let cosine = latitude.to_radians().cos().abs().max(MIN_LATITUDE_COSINE);
        Self {
            lat: resolution_m / METRES_PER_DEGREE_LAT,
            lng: resolution_m / (METRES_PER_DEGREE_LAT * cosine),
        }
    }
}

/// Validate raw vertices and rasterise the resulting polygon.
///
/// # Errors
/// Returns [`GeometryError`] when the vertices do not form a valid polygon.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_grid::{GridConfig, generate_grid};
///
/// let plan = generate_grid(
///     vec![
///         Coord { x: 0.0, y: 0.0 },
///         Coord { x: 0.01, y: 0.0 },
///         Coord { x: 0.0, y: 0.01 },
///     ],
///     100.0,
///     &GridConfig::default(),
/// )?;
/// assert!(!plan.centroids.is_empty());
/// assert!(plan.centroids.len() <= 200);
/// # Ok::<(), sitescore_grid::GeometryError>(())
/// ```
pub fn generate_grid(
    vertices: Vec<Coord<f64>>,
    cell_size_m: f64,
    config: &GridConfig,
) -> Result<GridPlan, GeometryError> {
    let polygon = SitePolygon::new(vertices)?;
    Ok(rasterise(&polygon, cell_size_m, config))
}

/// Rasterise a validated polygon into at most `config.max_cells` centroids.
///
/// Small polygons are sampled more finely, large ones more coarsely. A polygon
/// that captures no centroid yields its vertex mean as the single cell.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "resolution scaling works on areas and ratios"
)]
pub fn rasterise(polygon: &SitePolygon, cell_size_m: f64, config: &GridConfig) -> GridPlan {
    let area = polygon.area_m2();
    let max_cells = config.max_cells.max(1);
    let mut resolution = config.sanitize_cell_size(cell_size_m);

    if area > 0.0 && area < resolution * resolution * 4.0 {
        resolution = config.min_cell_m.max(area.sqrt() / 3.0);
        log::info!("auto-scaled resolution to {resolution:.1}m (area={area:.0}m²)");
    }
    let target = area / count_as_f64(max_cells);
    if resolution * resolution < target {
        resolution = target.sqrt();
    }
    resolution = fit_scan_budget(polygon, resolution, config.max_scan_points);

    let mut centroids = scan(polygon, resolution);
    let mut rounds = 0;
    while centroids.len() > max_cells && rounds < MAX_COARSEN_ROUNDS {
        let ratio = count_as_f64(centroids.len()) / count_as_f64(max_cells);
        resolution *= ratio.sqrt() * COARSEN_MARGIN;
        centroids = scan(polygon, resolution);
        rounds += 1;
    }
    if centroids.len() > max_cells {
        log::warn!(
            "grid still holds {} cells after coarsening; keeping the first {max_cells}",
            centroids.len()
        );
        centroids.truncate(max_cells);
    }
    if centroids.is_empty() {
        log::warn!("no cell centroid fell inside the polygon; using its centroid");
        centroids.push(polygon.centroid());
    }

    log::info!(
        "grid: {} cells at {resolution:.0}m resolution",
        centroids.len()
    );
    GridPlan {
        centroids,
        resolution_m: resolution,
    }
}

/// Coarsen `resolution` until the grown bounding box holds at most `budget`
/// scan points.
#[expect(clippy::float_arithmetic, reason = "the scan budget is a ratio of counts")]
fn fit_scan_budget(polygon: &SitePolygon, resolution: f64, budget: usize) -> f64 {
    let (lat_count, lng_count) = scan_counts(polygon, resolution);
    let points = count_as_f64(lat_count) * count_as_f64(lng_count);
    let limit = count_as_f64(budget.max(1));
    if points <= limit {
        return resolution;
    }
    let scaled = resolution * (points / limit).sqrt() * COARSEN_MARGIN;
    log::debug!("bounding box needs {points:.0} scan points; coarsening to {scaled:.0}m");
    scaled
}

/// Number of latitude rows and longitude columns scanned at `resolution`.
#[expect(clippy::float_arithmetic, reason = "box spans are divided into steps")]
fn scan_counts(polygon: &SitePolygon, resolution: f64) -> (usize, usize) {
    let bounds = polygon.bounds();
    let steps = Steps::for_resolution(resolution, polygon.centroid().y);
    let lat_span = bounds.height() + 2.0 * steps.lat;
    let lng_span = bounds.width() + 2.0 * steps.lng;
    (step_count(lat_span, steps.lat), step_count(lng_span, steps.lng))
}

/// Sample the bounding box grown by one step and keep the inside points.
#[expect(clippy::float_arithmetic, reason = "grid points are offsets from the box corner")]
fn scan(polygon: &SitePolygon, resolution: f64) -> Vec<Coord<f64>> {
    let bounds = polygon.bounds();
    let steps = Steps::for_resolution(resolution, polygon.centroid().y);
    let origin = Coord {
        x: bounds.min().x - steps.lng,
        y: bounds.min().y - steps.lat,
    };
    let (lat_count, lng_count) = scan_counts(polygon, resolution);
    let mut centroids = Vec::new();
    for row in 0..lat_count {
        let lat = origin.y + count_as_f64(row) * steps.lat;
        for column in 0..lng_count {
            let point = Coord {
                x: origin.x + count_as_f64(column) * steps.lng,
                y: lat,
            };
            if polygon.contains(point) {
                centroids.push(point);
            }
        }
    }
    centroids
}

/// Points at `0, step, 2·step, …` that stay within `span`.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the quotient is finite, non-negative and floored before conversion"
)]
fn step_count(span: f64, step: f64) -> usize {
    if step.is_nan() || step <= 0.0 || !span.is_finite() || span < 0.0 {
        return 1;
    }
    let quotient = (span / step).floor();
    if quotient >= 1.0e9 {
        return 1_000_000_000;
    }
    quotient as usize + 1
}

#[expect(clippy::cast_precision_loss, reason = "cell counts are far below 2^52")]
const fn count_as_f64(count: usize) -> f64 {
    count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> GridConfig {
        GridConfig::default()
    }

    fn square(side_deg: f64) -> SitePolygon {
        SitePolygon::new(vec![
            Coord { x: 77.0, y: 28.0 },
            Coord { x: 77.0 + side_deg, y: 28.0 },
            Coord { x: 77.0 + side_deg, y: 28.0 + side_deg },
            Coord { x: 77.0, y: 28.0 + side_deg },
        ])
        .expect("valid square")
    }

    #[rstest]
    #[case(f64::NAN, 100.0)]
    #[case(f64::INFINITY, 100.0)]
    #[case(0.0, 100.0)]
    #[case(-50.0, 100.0)]
    #[case(5.0, 10.0)]
    #[case(5_000.0, 1_000.0)]
    #[case(250.0, 250.0)]
    fn cell_sizes_are_sanitised(config: GridConfig, #[case] input: f64, #[case] expected: f64) {
        assert_eq!(config.sanitize_cell_size(input), expected);
    }

    #[rstest]
    fn tiny_triangle_yields_at_least_one_cell(config: GridConfig) {
        let plan = generate_grid(
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.01, y: 0.0 },
                Coord { x: 0.0, y: 0.01 },
            ],
            100.0,
            &config,
        )
        .expect("valid triangle");
        assert!(!plan.centroids.is_empty());
        assert!(plan.centroids.len() <= config.max_cells);
    }

    #[rstest]
    fn small_polygons_scale_finer(config: GridConfig) {
        // Roughly 110 m × 98 m: smaller than four 100 m cells.
        let plan = rasterise(&square(0.001), 100.0, &config);
        assert!(plan.resolution_m < 100.0);
        assert!(plan.resolution_m >= config.min_cell_m);
        assert!(plan.centroids.len() >= 4, "cells {}", plan.centroids.len());
    }

    #[rstest]
    fn large_polygons_scale_coarser(config: GridConfig) {
        let plan = rasterise(&square(0.5), 100.0, &config);
        assert!(plan.resolution_m > 100.0);
        assert!(plan.centroids.len() <= config.max_cells);
        assert!(plan.centroids.len() > 50, "cells {}", plan.centroids.len());
    }

    #[rstest]
    fn every_centroid_lies_inside(config: GridConfig) {
        let polygon = square(0.02);
        let plan = rasterise(&polygon, 200.0, &config);
        assert!(plan.centroids.iter().all(|point| polygon.contains(*point)));
    }

    #[rstest]
    fn sliver_falls_back_to_centroid(config: GridConfig) {
        let sliver = SitePolygon::new(vec![
            Coord { x: 77.0, y: 28.0 },
            Coord { x: 77.0, y: 28.0 },
            Coord { x: 77.0, y: 28.0 },
        ])
        .expect("degenerate but valid ring");
        let plan = rasterise(&sliver, 100.0, &config);
        assert_eq!(plan.centroids, vec![Coord { x: 77.0, y: 28.0 }]);
    }

    #[rstest]
    fn invalid_vertices_are_rejected(config: GridConfig) {
        let result = generate_grid(vec![Coord { x: 0.0, y: 0.0 }], 100.0, &config);
        assert_eq!(result, Err(GeometryError::TooFewVertices { count: 1 }));
    }

    #[rstest]
    #[case(0.0, 1.0, 1)]
    #[case(2.5, 1.0, 3)]
    #[case(3.0, 1.0, 4)]
    #[case(1.0, 0.0, 1)]
    #[case(f64::NAN, 1.0, 1)]
    fn step_counts_include_both_ends(#[case] span: f64, #[case] step: f64, #[case] expected: usize) {
        assert_eq!(step_count(span, step), expected);
    }
}
