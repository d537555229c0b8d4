//! Adaptive regional calibration.
//!
//! The calibrator learns, per [`RegionKey`], an exponential moving average
//! of observed scores and of residuals between actual and predicted
//! performance. Once a region holds enough samples the two signals are
//! blended into a bounded additive adjustment.
//!
//! State is owned by the caller: share one calibrator through an
//! [`Arc`](std::sync::Arc) and every scorer sees the same regions. All
//! mutation happens behind a single mutex, so the read of the prior state and
//! the subsequent record of a new score form one critical section.
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use geo::Coord;
use sitescore_core::RegionalStats;
use sitescore_core::normalise::{clamp, round_hundredths, round_tenths};

use crate::history::{HistoricalScore, HistoryQuery, HistorySource};
use crate::region::RegionKey;

/// Tuning parameters for [`RegionalCalibrator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratorConfig {
    /// Smoothing factor of both moving averages.
    pub ema_alpha: f64,
    /// Largest absolute adjustment in score points.
    pub max_adjustment: f64,
    /// Samples a region needs before any adjustment applies.
    pub min_samples: u32,
    /// Neutral score the regional trend is measured against.
    pub baseline_score: f64,
    /// Points of adjustment per point of trend above the baseline.
    pub trend_gain: f64,
    /// Share of the residual signal in the blended adjustment.
    pub residual_weight: f64,
    /// Share of the trend signal in the blended adjustment.
    pub trend_weight: f64,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            ema_alpha: 0.12,
            max_adjustment: 10.0,
            min_samples: 5,
            baseline_score: 65.0,
            trend_gain: 0.20,
            residual_weight: 0.6,
            trend_weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CalibrationEntry {
    ema_score: f64,
    samples: u32,
    ema_residual: f64,
}

/// Thread-safe store of per-region calibration state.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_scorer::RegionalCalibrator;
///
/// let calibrator = RegionalCalibrator::default();
/// let site = Coord { x: 77.2, y: 28.6 };
/// for _ in 0..10 {
///     calibrator.record(site, 90.0);
/// }
/// assert!((calibrator.adjustment(site, 80.0) - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Default)]
pub struct RegionalCalibrator {
    config: CalibratorConfig,
    entries: Mutex<HashMap<RegionKey, CalibrationEntry>>,
}

impl RegionalCalibrator {
    /// Create an empty calibrator with the given tuning.
    #[must_use]
    pub fn new(config: CalibratorConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Active tuning parameters.
    #[must_use]
    pub const fn config(&self) -> &CalibratorConfig {
        &self.config
    }

    /// Adjustment for a site given the current regional state.
    ///
    /// `raw_score` does not influence the adjustment; it is logged for
    /// traceability. Unknown regions, regions below the sample threshold and
    /// invalid coordinates all yield `0.0`.
    #[must_use]
    pub fn adjustment(&self, location: Coord<f64>, raw_score: f64) -> f64 {
        let Some(key) = RegionKey::from_coord(location) else {
            return 0.0;
        };
        let entries = self.entries();
        let adjustment = self.adjustment_for(entries.get(&key));
        log::debug!("region {key}: raw score {raw_score:.0} adjusted by {adjustment:+.2}");
        adjustment
    }

    /// Fold an observed score into its region's moving average.
    ///
    /// Invalid coordinates are ignored.
    pub fn record(&self, location: Coord<f64>, score: f64) {
        if let Some(key) = RegionKey::from_coord(location) {
            self.record_key(&mut self.entries(), key, score);
        }
    }

    /// Compute the adjustment from the prior state, then record `raw_score`,
    /// without releasing the lock in between.
    pub fn observe(&self, location: Coord<f64>, raw_score: f64) -> f64 {
        let Some(key) = RegionKey::from_coord(location) else {
            return 0.0;
        };
        let mut entries = self.entries();
        let adjustment = self.adjustment_for(entries.get(&key));
        self.record_key(&mut entries, key, raw_score);
        log::debug!("region {key}: raw score {raw_score:.0} adjusted by {adjustment:+.2}");
        adjustment
    }

    /// Fold an `actual - predicted` residual into the region's residual
    /// average.
    ///
    /// A region seen for the first time starts with `predicted` as its score
    /// average. Each residual counts as one sample.
    #[expect(clippy::float_arithmetic, reason = "moving averages blend residuals")]
    pub fn record_residual(&self, location: Coord<f64>, actual: f64, predicted: f64) {
        let Some(key) = RegionKey::from_coord(location) else {
            return;
        };
        let alpha = self.config.ema_alpha;
        let mut entries = self.entries();
        let entry = entries.entry(key).or_insert(CalibrationEntry {
            ema_score: predicted,
            samples: 0,
            ema_residual: 0.0,
        });
        let residual = actual - predicted;
        entry.ema_residual = alpha * residual + (1.0 - alpha) * entry.ema_residual;
        entry.samples = entry.samples.saturating_add(1);
    }

    /// Bulk-load historical scores into the score averages.
    ///
    /// Records with invalid coordinates or non-finite scores are skipped.
    /// Returns the number of records applied.
    pub fn seed<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = HistoricalScore>,
    {
        let mut entries = self.entries();
        let mut applied = 0_usize;
        let mut skipped = 0_usize;
        for record in records {
            match RegionKey::from_coord(record.location) {
                Some(key) if record.score.is_finite() => {
                    self.record_key(&mut entries, key, record.score);
                    applied = applied.saturating_add(1);
                }
                _ => skipped = skipped.saturating_add(1),
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {skipped} historical scores with invalid coordinates or scores");
        }
        log::info!(
            "Seeded calibrator with {applied} historical scores over {} regions",
            entries.len()
        );
        applied
    }

    /// Load records from `source` and [`seed`](Self::seed) them.
    ///
    /// # Errors
    /// Propagates the source's error; the calibrator is left untouched.
    pub fn seed_from<S>(&self, source: &S, query: &HistoryQuery) -> Result<usize, S::Error>
    where
        S: HistorySource + ?Sized,
    {
        let records = source.load(query)?;
        Ok(self.seed(records))
    }

    /// Snapshot of a region's state, or `None` for invalid coordinates.
    ///
    /// Regions without observations report the baseline score and zero
    /// samples.
    #[must_use]
    pub fn regional_stats(&self, location: Coord<f64>) -> Option<RegionalStats> {
        let key = RegionKey::from_coord(location)?;
        let entries = self.entries();
        let stats = entries.get(&key).map_or_else(
            || RegionalStats {
                region: key.to_string(),
                samples: 0,
                mean_score: self.config.baseline_score,
                mean_residual: 0.0,
            },
            |entry| RegionalStats {
                region: key.to_string(),
                samples: entry.samples,
                mean_score: round_tenths(entry.ema_score),
                mean_residual: round_hundredths(entry.ema_residual),
            },
        );
        Some(stats)
    }

    /// Forget every region.
    pub fn reset(&self) {
        self.entries().clear();
    }

    /// Number of regions holding state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Report whether no region holds state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // Entries hold plain numbers, so a poisoned lock still guards usable data.
    fn entries(&self) -> MutexGuard<'_, HashMap<RegionKey, CalibrationEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[expect(clippy::float_arithmetic, reason = "the adjustment blends two averages")]
    fn adjustment_for(&self, candidate: Option<&CalibrationEntry>) -> f64 {
        let config = &self.config;
        let Some(entry) = candidate.filter(|found| found.samples >= config.min_samples) else {
            return 0.0;
        };
        let trend = (entry.ema_score - config.baseline_score) * config.trend_gain;
        let combined = entry.ema_residual * config.residual_weight + trend * config.trend_weight;
        clamp(combined, -config.max_adjustment, config.max_adjustment)
    }

    #[expect(clippy::float_arithmetic, reason = "moving averages blend scores")]
    fn record_key(
        &self,
        entries: &mut HashMap<RegionKey, CalibrationEntry>,
        key: RegionKey,
        score: f64,
    ) {
        let alpha = self.config.ema_alpha;
        entries
            .entry(key)
            .and_modify(|entry| {
                entry.ema_score = alpha * score + (1.0 - alpha) * entry.ema_score;
                entry.samples = entry.samples.saturating_add(1);
            })
            .or_insert(CalibrationEntry {
                ema_score: score,
                samples: 1,
                ema_residual: 0.0,
            });
    }
}
