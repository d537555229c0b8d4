//! Deterministic, offline terrain estimates for grid cells.
//!
//! Neither function samples real terrain. They derive a repeatable relief
//! field from a coordinate hash so neighbouring cells differ plausibly.
#![forbid(unsafe_code)]

use geo::Coord;
use sitescore_core::normalise::round_hundredths;

/// Offset of the cardinal slope samples, about 200 m.
pub const SLOPE_OFFSET_DEG: f64 = 0.0018;

/// Metres per degree used to turn the stencil offset into a run length.
const STENCIL_METRES_PER_DEGREE: f64 = 111_000.0;

/// Peak relief added to or removed from the base elevation (m).
const RELIEF_AMPLITUDE_M: f64 = 15.0;

/// Largest extra slope applied by [`perturb`] (degrees).
const SLOPE_JITTER_DEG: f64 = 2.0;

/// Elevation and slope of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    /// Elevation above sea level (m).
    pub elevation_m: f64,
    /// Terrain slope (degrees).
    pub slope_deg: f64,
}

/// Repeatable pseudo-random seed for a coordinate, in `[0, 21)`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_grid::terrain::cell_seed;
///
/// let seed = cell_seed(Coord { x: -73.99, y: 40.73 });
/// assert!((0.0..21.0).contains(&seed));
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "the seed mixes scaled coordinates")]
pub fn cell_seed(at: Coord<f64>) -> f64 {
    (at.y * 1_000.0).rem_euclid(13.7) + (at.x * 1_000.0).rem_euclid(7.3)
}

fn relief(at: Coord<f64>) -> f64 {
    (cell_seed(at) * 1.4).sin() * RELIEF_AMPLITUDE_M
}

/// Jitter a base elevation and slope for one cell: slope gains up to 2°,
/// elevation moves by up to ±15 m. Neither drops below zero.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "terrain deltas are additive")]
pub fn perturb(base: TerrainSample, at: Coord<f64>) -> TerrainSample {
    let seed = cell_seed(at);
    let slope_delta = ((seed * 3.7).cos() * SLOPE_JITTER_DEG).abs();
    TerrainSample {
        elevation_m: (base.elevation_m + relief(at)).max(0.0),
        slope_deg: (base.slope_deg + slope_delta).max(0.0),
    }
}

/// Estimate elevation and slope at `at` from the relief field around a base
/// sample.
///
/// The local slope comes from a four-point cardinal stencil at
/// [`SLOPE_OFFSET_DEG`]: the north-south and east-west rises over twice the
/// offset form the gradient. It is added to the base slope and reported in
/// degrees with two decimals.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "the stencil is finite differences")]
pub fn estimate_local(base: TerrainSample, at: Coord<f64>) -> TerrainSample {
    let height = |lat_offset: f64, lng_offset: f64| {
        base.elevation_m
            + relief(Coord {
                x: at.x + lng_offset,
                y: at.y + lat_offset,
            })
    };
    let north = height(SLOPE_OFFSET_DEG, 0.0);
    let south = height(-SLOPE_OFFSET_DEG, 0.0);
    let east = height(0.0, SLOPE_OFFSET_DEG);
    let west = height(0.0, -SLOPE_OFFSET_DEG);

    let run = 2.0 * SLOPE_OFFSET_DEG * STENCIL_METRES_PER_DEGREE;
    let dz_ns = (north - south).abs() / run;
    let dz_ew = (east - west).abs() / run;
    TerrainSample {
        elevation_m: height(0.0, 0.0).max(0.0),
        slope_deg: round_hundredths(
            base.slope_deg.max(0.0) + dz_ns.hypot(dz_ew).atan().to_degrees(),
        ),
    }
}
