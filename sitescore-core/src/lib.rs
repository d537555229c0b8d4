//! Core scoring model for the site suitability engine.
//!
//! The crate turns raw environmental measurements into normalised factor
//! scores, advisory constraint violations, a confidence estimate and the
//! banded [`ScoreResult`]. Everything here is pure arithmetic; shared state
//! such as regional calibration lives in `sitescore-scorer`.
#![forbid(unsafe_code)]

pub mod confidence;
pub mod constraint;
pub mod factor;
pub mod grade;
pub mod measurement;
pub mod normalise;
pub mod result;

pub use confidence::{ConfidenceInputs, MAX_DATA_SOURCES, estimate_confidence};
pub use constraint::{ConstraintCode, ConstraintReport, ConstraintViolation, check_constraints};
pub use factor::{Factor, FactorScores, LAND_PER_KW_M2};
pub use grade::{Grade, SuitabilityClass, recommendation};
pub use measurement::{ResolvedMeasurements, SiteMeasurements};
pub use result::{RegionalStats, ScoreParts, ScoreResult};

/// Evaluate all eight factor scorers for a resolved measurement set.
///
/// # Examples
/// ```
/// use sitescore_core::{SiteMeasurements, score_factors};
///
/// let scores = score_factors(&SiteMeasurements::new(5.5, 3.5, 600.0).resolve());
/// assert_eq!(scores.solar, 1.0);
/// assert_eq!(scores.wind, 1.0);
/// ```
#[must_use]
pub fn score_factors(site: &ResolvedMeasurements) -> FactorScores {
    FactorScores {
        solar: factor::score_solar(site.solar_irradiance),
        temperature: factor::score_temperature(site.temperature_c),
        elevation: factor::score_elevation(site.elevation_m),
        wind: factor::score_wind(site.wind_speed),
        cloud: factor::score_cloud(site.cloud_cover_pct),
        slope: factor::score_slope(site.slope_deg),
        grid: factor::score_grid(site.grid_distance_km),
        plant_size: factor::score_plant_size(
            site.plant_capacity_kw,
            Some(site.available_area_m2),
            site.solar_irradiance,
        ),
    }
}
