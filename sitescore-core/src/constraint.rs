//! Hard-threshold checks that flag clearly unviable sites.
//!
//! The filter never aborts scoring; each breached threshold contributes one
//! advisory [`ConstraintViolation`].

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::factor::LAND_PER_KW_M2;
use crate::measurement::ResolvedMeasurements;

/// Minimum viable irradiance (kWh/m²/day).
pub const MIN_SOLAR_IRRADIANCE: f64 = 2.0;
/// Maximum slope for ground-mounted installations (degrees).
pub const MAX_SLOPE_DEG: f64 = 25.0;
/// Maximum mean cloud cover (%).
pub const MAX_CLOUD_COVER_PCT: f64 = 90.0;
/// Maximum distance to the grid (km).
pub const MAX_GRID_DISTANCE_KM: f64 = 100.0;

/// Machine-readable identifier of a breached threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConstraintCode {
    /// Irradiance below [`MIN_SOLAR_IRRADIANCE`].
    LowIrradiance,
    /// Slope above [`MAX_SLOPE_DEG`].
    SteepSlope,
    /// Cloud cover above [`MAX_CLOUD_COVER_PCT`].
    PersistentCloud,
    /// Grid distance above [`MAX_GRID_DISTANCE_KM`].
    RemoteGrid,
    /// Available land smaller than the plant footprint.
    InsufficientArea,
}

impl ConstraintCode {
    /// Stable snake-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowIrradiance => "low_irradiance",
            Self::SteepSlope => "steep_slope",
            Self::PersistentCloud => "persistent_cloud",
            Self::RemoteGrid => "remote_grid",
            Self::InsufficientArea => "insufficient_area",
        }
    }
}

impl fmt::Display for ConstraintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A breached threshold with a human-readable explanation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ConstraintViolation {
    /// Which threshold was breached.
    pub code: ConstraintCode,
    /// Explanation with the offending values interpolated.
    pub reason: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}

/// Outcome of the constraint filter.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ConstraintReport {
    /// Violations in evaluation order.
    pub violations: Vec<ConstraintViolation>,
}

impl ConstraintReport {
    /// `true` when no threshold was breached.
    #[must_use]
    pub fn is_suitable(&self) -> bool {
        self.violations.is_empty()
    }

    /// Report whether a particular threshold was breached.
    #[must_use]
    pub fn contains(&self, code: ConstraintCode) -> bool {
        self.violations.iter().any(|violation| violation.code == code)
    }

    fn push(&mut self, code: ConstraintCode, reason: String) {
        self.violations.push(ConstraintViolation { code, reason });
    }
}

/// Check a resolved measurement set against every hard threshold.
///
/// # Examples
/// ```
/// use sitescore_core::{ConstraintCode, SiteMeasurements, check_constraints};
///
/// let report = check_constraints(&SiteMeasurements::new(1.5, 3.0, 200.0).resolve());
/// assert!(!report.is_suitable());
/// assert!(report.contains(ConstraintCode::LowIrradiance));
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the area check derives the plant footprint and utilisation"
)]
pub fn check_constraints(site: &ResolvedMeasurements) -> ConstraintReport {
    let mut report = ConstraintReport::default();

    if site.solar_irradiance < MIN_SOLAR_IRRADIANCE {
        report.push(
            ConstraintCode::LowIrradiance,
            format!(
                "Solar irradiance {:.1} kWh/m²/d is below minimum ({MIN_SOLAR_IRRADIANCE:.1} \
                 kWh/m²/d). Location is not viable.",
                site.solar_irradiance
            ),
        );
    }

    if site.slope_deg > MAX_SLOPE_DEG {
        report.push(
            ConstraintCode::SteepSlope,
            format!(
                "Terrain slope {:.1}° exceeds {MAX_SLOPE_DEG:.1}°. Ground-mount installation \
                 is not feasible.",
                site.slope_deg
            ),
        );
    }

    if site.cloud_cover_pct > MAX_CLOUD_COVER_PCT {
        report.push(
            ConstraintCode::PersistentCloud,
            format!(
                "Cloud cover {:.0}% is too high for reliable solar generation.",
                site.cloud_cover_pct
            ),
        );
    }

    if site.grid_distance_km > MAX_GRID_DISTANCE_KM {
        report.push(
            ConstraintCode::RemoteGrid,
            format!(
                "Grid distance {:.0}km exceeds {MAX_GRID_DISTANCE_KM:.0}km. Grid connection \
                 cost makes this unviable.",
                site.grid_distance_km
            ),
        );
    }

    let available = site.available_area_m2;
    let required = site.plant_capacity_kw * LAND_PER_KW_M2;
    if available > 0.0 && required > 0.0 && available < required {
        let utilisation = required / available * 100.0;
        report.push(
            ConstraintCode::InsufficientArea,
            format!(
                "Insufficient area: {:.0}kW plant needs ~{required:.0}m² but only \
                 {available:.0}m² is available ({utilisation:.0}% utilisation). Reduce plant \
                 size to ≤{:.1}kW or select a larger area.",
                site.plant_capacity_kw,
                available / LAND_PER_KW_M2
            ),
        );
    }

    report
}
