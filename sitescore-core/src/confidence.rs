//! Reliability estimate attached to every score.
//!
//! Confidence blends three signals: whether the climate sub-scores agree with
//! each other, how many live upstream sources answered, and whether the raw
//! inputs are physically plausible.

use crate::factor::{score_cloud, score_solar, score_temperature, score_wind};
use crate::measurement::ResolvedMeasurements;
use crate::normalise::{clamp_unit, round_tenths};

/// Number of upstream providers a fully live evaluation draws on.
pub const MAX_DATA_SOURCES: u8 = 4;

const AGREEMENT_WEIGHT: f64 = 0.50;
const SOURCE_WEIGHT: f64 = 0.30;
const PLAUSIBILITY_WEIGHT: f64 = 0.20;
// Largest variance expected between sub-scores in the unit interval.
const MAX_EXPECTED_VARIANCE: f64 = 0.25;

/// Inputs to [`estimate_confidence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    /// Irradiance (kWh/m²/day).
    pub solar_irradiance: f64,
    /// Temperature (°C).
    pub temperature_c: f64,
    /// Wind speed (m/s).
    pub wind_speed: f64,
    /// Cloud cover (%).
    pub cloud_cover_pct: f64,
    /// Relative humidity (%).
    pub humidity_pct: f64,
    /// Live upstream sources that responded, `0..=4`.
    pub data_sources: u8,
}

impl ConfidenceInputs {
    /// Collect confidence inputs from a resolved measurement set.
    #[must_use]
    pub const fn from_measurements(site: &ResolvedMeasurements, data_sources: u8) -> Self {
        Self {
            solar_irradiance: site.solar_irradiance,
            temperature_c: site.temperature_c,
            wind_speed: site.wind_speed,
            cloud_cover_pct: site.cloud_cover_pct,
            humidity_pct: site.humidity_pct,
            data_sources,
        }
    }
}

/// Estimate how much the score can be trusted, as a percentage rounded to
/// one decimal.
///
/// # Examples
/// ```
/// use sitescore_core::{ConfidenceInputs, estimate_confidence};
///
/// let confidence = estimate_confidence(&ConfidenceInputs {
///     solar_irradiance: 5.5,
///     temperature_c: 22.0,
///     wind_speed: 3.5,
///     cloud_cover_pct: 30.0,
///     humidity_pct: 50.0,
///     data_sources: 4,
/// });
/// assert!(confidence > 95.0 && confidence <= 100.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "confidence is a weighted blend of unit-interval signals"
)]
pub fn estimate_confidence(inputs: &ConfidenceInputs) -> f64 {
    let sub_scores = [
        score_solar(inputs.solar_irradiance),
        score_temperature(inputs.temperature_c),
        score_wind(inputs.wind_speed),
        score_cloud(inputs.cloud_cover_pct),
    ];
    let agreement = clamp_unit(1.0 - population_variance(&sub_scores) / MAX_EXPECTED_VARIANCE);
    let source_quality =
        clamp_unit(f64::from(inputs.data_sources) / f64::from(MAX_DATA_SOURCES));
    let plausibility = clamp_unit(1.0 - plausibility_penalty(inputs));

    let blended = AGREEMENT_WEIGHT * agreement
        + SOURCE_WEIGHT * source_quality
        + PLAUSIBILITY_WEIGHT * plausibility;
    round_tenths(clamp_unit(blended) * 100.0)
}

#[expect(clippy::float_arithmetic, reason = "penalties accumulate additively")]
fn plausibility_penalty(inputs: &ConfidenceInputs) -> f64 {
    let mut penalty = 0.0;
    if !(0.0..=12.0).contains(&inputs.solar_irradiance) {
        penalty += 0.15;
    }
    if !(-60.0..=60.0).contains(&inputs.temperature_c) {
        penalty += 0.10;
    }
    if !(0.0..=100.0).contains(&inputs.humidity_pct) {
        penalty += 0.05;
    }
    if !(0.0..=100.0).contains(&inputs.cloud_cover_pct) {
        penalty += 0.05;
    }
    penalty
}

#[expect(
    clippy::float_arithmetic,
    reason = "variance is computed over four fixed sub-scores"
)]
fn population_variance(values: &[f64; 4]) -> f64 {
    let mean = values.iter().sum::<f64>() / 4.0;
    values
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>()
        / 4.0
}
