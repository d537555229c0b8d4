//! Composite scoring: factors, weights, calibration and banding.
#![forbid(unsafe_code)]

use std::sync::Arc;

use sitescore_core::result::raw_score;
use sitescore_core::{
    ConfidenceInputs, ConstraintReport, ResolvedMeasurements, ScoreParts, ScoreResult,
    SiteMeasurements, check_constraints, estimate_confidence, score_factors,
};

use crate::calibrator::RegionalCalibrator;
use crate::error::ScoreError;
use crate::region::is_valid_coordinate;

/// Per-evaluation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOptions {
    /// Apply and update regional calibration when the site has a location.
    pub apply_calibration: bool,
    /// Run the constraint filter.
    pub run_constraints: bool,
    /// Live upstream sources that supplied the measurements.
    pub data_sources: u8,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            apply_calibration: true,
            run_constraints: true,
            data_sources: 3,
        }
    }
}

impl ScoreOptions {
    /// Options for repeatable evaluations that leave calibration untouched.
    #[must_use]
    pub const fn uncalibrated() -> Self {
        Self {
            apply_calibration: false,
            run_constraints: true,
            data_sources: 3,
        }
    }
}

/// Scores sites against an injected calibrator.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use sitescore_core::{Grade, SiteMeasurements};
/// use sitescore_scorer::{RegionalCalibrator, ScoreOptions, SiteScorer};
///
/// let scorer = SiteScorer::new(Arc::new(RegionalCalibrator::default()));
/// let site = SiteMeasurements::new(5.5, 3.5, 600.0)
///     .with_temperature(22.0)
///     .with_cloud_cover(30.0)
///     .with_slope(2.0)
///     .with_grid_distance(5.0);
/// let result = scorer.score(&site, ScoreOptions::default())?;
/// assert_eq!(result.grade, Grade::APlus);
/// # Ok::<(), sitescore_scorer::ScoreError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SiteScorer {
    calibrator: Option<Arc<RegionalCalibrator>>,
}

impl SiteScorer {
    /// Create a scorer that shares `calibrator`.
    #[must_use]
    pub const fn new(calibrator: Arc<RegionalCalibrator>) -> Self {
        Self {
            calibrator: Some(calibrator),
        }
    }

    /// Create a scorer that never calibrates.
    #[must_use]
    pub const fn without_calibration() -> Self {
        Self { calibrator: None }
    }

    /// The shared calibrator, if any.
    #[must_use]
    pub const fn calibrator(&self) -> Option<&Arc<RegionalCalibrator>> {
        self.calibrator.as_ref()
    }

    /// Score a site. Constraint violations are reported on the result and
    /// never prevent scoring.
    ///
    /// # Errors
    /// Returns [`ScoreError::InvalidLocation`] when the site carries a
    /// non-finite or out-of-range coordinate.
    pub fn score(
        &self,
        site: &SiteMeasurements,
        options: ScoreOptions,
    ) -> Result<ScoreResult, ScoreError> {
        let resolved = resolve_located(site)?;
        let report = if options.run_constraints {
            check_constraints(&resolved)
        } else {
            ConstraintReport::default()
        };
        Ok(self.evaluate(&resolved, report, options))
    }

    /// Score a site, rejecting it outright when any constraint is breached.
    ///
    /// Rejected sites are not recorded by the calibrator.
    ///
    /// # Errors
    /// Returns [`ScoreError::InvalidLocation`] for an unusable coordinate and
    /// [`ScoreError::Rejected`] carrying every violation.
    pub fn score_strict(
        &self,
        site: &SiteMeasurements,
        options: ScoreOptions,
    ) -> Result<ScoreResult, ScoreError> {
        let resolved = resolve_located(site)?;
        let report = check_constraints(&resolved);
        if !report.is_suitable() {
            return Err(ScoreError::Rejected {
                violations: report.violations,
            });
        }
        Ok(self.evaluate(&resolved, report, options))
    }

    /// Score already resolved measurements with a precomputed constraint
    /// report.
    ///
    /// The location is trusted; callers pass coordinates they produced
    /// themselves, such as grid centroids.
    #[must_use]
    pub fn evaluate(
        &self,
        site: &ResolvedMeasurements,
        report: ConstraintReport,
        options: ScoreOptions,
    ) -> ScoreResult {
        let factors = score_factors(site);
        let raw = raw_score(factors.weighted_sum());

        let active = self
            .calibrator
            .as_ref()
            .filter(|_| options.apply_calibration);
        let (adjustment, regional_stats) = match (active, site.location) {
            (Some(calibrator), Some(location)) => (
                calibrator.observe(location, f64::from(raw)),
                calibrator.regional_stats(location),
            ),
            _ => (0.0, None),
        };

        let confidence =
            estimate_confidence(&ConfidenceInputs::from_measurements(site, options.data_sources));
        let result = ScoreResult::assemble(ScoreParts {
            raw_score: raw,
            adjustment,
            confidence,
            factors,
            violations: report.violations,
            regional_stats,
        });
        log::debug!(
            "lat={:.2} solar={:.2} wind={:.1} elev={:.0}m slope={:.1} grid={:.0}km \
             plant={:.0}kW raw={raw} adj={adjustment:+.1} final={} conf={}% suitability={}",
            site.latitude,
            site.solar_irradiance,
            site.wind_speed,
            site.elevation_m,
            site.slope_deg,
            site.grid_distance_km,
            site.plant_capacity_kw,
            result.score,
            result.confidence,
            result.suitability,
        );
        result
    }
}

fn resolve_located(site: &SiteMeasurements) -> Result<ResolvedMeasurements, ScoreError> {
    match site.location {
        Some(location) if !is_valid_coordinate(location) => Err(ScoreError::InvalidLocation {
            lat: location.y,
            lng: location.x,
        }),
        _ => Ok(site.resolve()),
    }
}
