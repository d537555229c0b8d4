//! The immutable outcome of one site evaluation.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::constraint::ConstraintViolation;
use crate::factor::FactorScores;
use crate::grade::{Grade, SuitabilityClass, recommendation};
use crate::normalise::{clamp, round_hundredths};

/// Multiplier applied to the weighted factor sum so strong sites reach the
/// upper nineties.
pub const SCORE_SCALE: f64 = 105.0;

/// Snapshot of the calibration state for the region a site falls in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RegionalStats {
    /// Region identifier, such as `"25_75"`.
    pub region: String,
    /// Observations recorded for the region.
    pub samples: u32,
    /// Exponential moving average of observed scores.
    pub mean_score: f64,
    /// Exponential moving average of residuals (actual minus predicted).
    pub mean_residual: f64,
}

/// Full result of scoring one site.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScoreResult {
    /// Final score after calibration, `0..=100`.
    pub score: u8,
    /// Score before calibration, `0..=100`.
    pub raw_score: u8,
    /// Letter grade of [`Self::score`].
    pub grade: Grade,
    /// Suitability class of [`Self::score`].
    pub suitability: SuitabilityClass,
    /// Confidence percentage, `0.0..=100.0` with one decimal.
    pub confidence: f64,
    /// Calibration adjustment applied to the raw score, two decimals.
    pub calibration_adjustment: f64,
    /// Advisory constraint violations.
    pub violations: Vec<ConstraintViolation>,
    /// `true` when no constraint was violated.
    pub is_suitable: bool,
    /// Per-factor sub-scores as `0.0..=100.0` percentages.
    pub factors: FactorScores,
    /// Recommendation text for the score band.
    pub recommendation: &'static str,
    /// Calibration state of the site's region, when calibration ran.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub regional_stats: Option<RegionalStats>,
}

/// Ingredients of a [`ScoreResult`] before banding.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreParts {
    /// Score before calibration.
    pub raw_score: u8,
    /// Calibration adjustment in score points.
    pub adjustment: f64,
    /// Confidence percentage.
    pub confidence: f64,
    /// Normalised factor scores in `0.0..=1.0`.
    pub factors: FactorScores,
    /// Advisory constraint violations.
    pub violations: Vec<ConstraintViolation>,
    /// Regional calibration snapshot.
    pub regional_stats: Option<RegionalStats>,
}

impl ScoreResult {
    /// Assemble a result, deriving the final score and every band from the
    /// raw score and adjustment.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "the adjustment is additive")]
    pub fn assemble(parts: ScoreParts) -> Self {
        let score = truncate_score(f64::from(parts.raw_score) + parts.adjustment);
        Self {
            score,
            raw_score: parts.raw_score,
            grade: Grade::from_score(score),
            suitability: SuitabilityClass::from_score(score),
            confidence: parts.confidence,
            calibration_adjustment: round_hundredths(parts.adjustment),
            is_suitable: parts.violations.is_empty(),
            violations: parts.violations,
            factors: parts.factors.to_percentages(),
            recommendation: recommendation(score),
            regional_stats: parts.regional_stats,
        }
    }
}

/// Scale a weighted factor sum onto `0..=100`, rounding half to even.
///
/// # Examples
/// ```
/// use sitescore_core::result::raw_score;
///
/// assert_eq!(raw_score(0.5), 52);
/// assert_eq!(raw_score(2.0), 100);
/// assert_eq!(raw_score(f64::NAN), 0);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "the weighted sum is scaled")]
pub fn raw_score(weighted_sum: f64) -> u8 {
    to_score(clamp(weighted_sum * SCORE_SCALE, 0.0, 100.0).round_ties_even())
}

/// Clamp to `0..=100` and drop the fractional part.
#[must_use]
pub fn truncate_score(value: f64) -> u8 {
    to_score(clamp(value, 0.0, 100.0).trunc())
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "callers pass whole numbers already clamped to 0..=100"
)]
const fn to_score(value: f64) -> u8 {
    value as u8
}
