//! Coarse 5° × 5° regions used to group calibration observations.
#![forbid(unsafe_code)]

use std::fmt;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Edge length of a calibration region in degrees.
pub const REGION_SIZE_DEG: f64 = 5.0;

/// Identifier of a calibration region: the coordinates snapped to the
/// nearest multiple of [`REGION_SIZE_DEG`], ties rounding to even.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_scorer::RegionKey;
///
/// let key = RegionKey::from_coord(Coord { x: 72.6, y: 26.9 }).expect("valid coordinate");
/// assert_eq!(key.to_string(), "25_75");
/// assert!(RegionKey::from_coord(Coord { x: 0.0, y: 95.0 }).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RegionKey {
    /// Snapped latitude in whole degrees.
    pub lat: i32,
    /// Snapped longitude in whole degrees.
    pub lng: i32,
}

impl RegionKey {
    /// Snap a WGS84 coordinate (`x = longitude`, `y = latitude`) to its
    /// region.
    ///
    /// Returns `None` for non-finite or out-of-range coordinates so the
    /// calibrator never grows beyond the finite set of valid regions.
    #[must_use]
    pub fn from_coord(coord: Coord<f64>) -> Option<Self> {
        if !is_valid_coordinate(coord) {
            return None;
        }
        Some(Self {
            lat: snap(coord.y),
            lng: snap(coord.x),
        })
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.lat, self.lng)
    }
}

/// Report whether `coord` is a finite WGS84 position.
#[must_use]
pub fn is_valid_coordinate(coord: Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "validated coordinates snap to small whole multiples of five"
)]
fn snap(degrees: f64) -> i32 {
    ((degrees / REGION_SIZE_DEG).round_ties_even() * REGION_SIZE_DEG) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(26.9, 72.6, 25, 75)]
    #[case(2.5, -2.5, 0, 0)]
    #[case(7.5, 12.5, 10, 10)]
    #[case(-90.0, 180.0, -90, 180)]
    fn snaps_to_nearest_five_with_even_ties(
        #[case] lat: f64,
        #[case] lng: f64,
        #[case] expected_lat: i32,
        #[case] expected_lng: i32,
    ) {
        let key = RegionKey::from_coord(Coord { x: lng, y: lat }).expect("valid coordinate");
        assert_eq!(
            key,
            RegionKey {
                lat: expected_lat,
                lng: expected_lng
            }
        );
    }

    #[rstest]
    #[case(f64::NAN, 10.0)]
    #[case(91.0, 10.0)]
    #[case(10.0, -180.5)]
    #[case(f64::INFINITY, 0.0)]
    fn rejects_invalid_coordinates(#[case] lat: f64, #[case] lng: f64) {
        assert!(RegionKey::from_coord(Coord { x: lng, y: lat }).is_none());
    }
}
