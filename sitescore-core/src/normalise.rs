//! Response curves mapping a raw physical measurement onto `0.0..=1.0`.
//!
//! Every primitive is total: degenerate parameters and exponent overflow
//! collapse to a saturating value instead of propagating `NaN` or infinity.

/// Gaussian bell curve peaking at `1.0` when `x == optimal`.
///
/// Computes `exp(-0.5 * ((x - optimal) / spread)^2)`. A zero or non-finite
/// `spread`, or a non-finite result, yields `0.0`.
///
/// # Examples
/// ```
/// use sitescore_core::normalise::gaussian;
///
/// assert_eq!(gaussian(5.5, 5.5, 1.8), 1.0);
/// assert_eq!(gaussian(1.0, 0.0, 0.0), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the bell curve is defined in floating point"
)]
pub fn gaussian(x: f64, optimal: f64, spread: f64) -> f64 {
    if spread == 0.0 || !spread.is_finite() {
        return 0.0;
    }
    let z = (x - optimal) / spread;
    let value = (-0.5 * z * z).exp();
    if value.is_finite() { value } else { 0.0 }
}

/// Logistic curve, monotonically non-decreasing in `x`.
///
/// Computes `1 / (1 + exp(-steepness * (x - midpoint)))`. When the exponent
/// overflows the curve saturates on the side given by the sign of
/// `x - midpoint`; a `NaN` input scores `0.0`.
///
/// # Examples
/// ```
/// use sitescore_core::normalise::sigmoid;
///
/// assert_eq!(sigmoid(50.0, 50.0, 0.06), 0.5);
/// assert_eq!(sigmoid(1.0e6, 0.0, 1.0), 1.0);
/// assert_eq!(sigmoid(-1.0e6, 0.0, 1.0), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the logistic curve is defined in floating point"
)]
pub fn sigmoid(x: f64, midpoint: f64, steepness: f64) -> f64 {
    let offset = x - midpoint;
    let exponent = (-steepness * offset).exp();
    if exponent.is_finite() {
        let value = 1.0 / (1.0 + exponent);
        if value.is_finite() {
            return value;
        }
    }
    saturate(offset)
}

const fn saturate(offset: f64) -> f64 {
    if offset.is_nan() || offset < 0.0 {
        0.0
    } else {
        1.0
    }
}

/// Bound `value` to `lo..=hi`. `NaN` maps to `lo`.
///
/// # Examples
/// ```
/// use sitescore_core::normalise::clamp;
///
/// assert_eq!(clamp(120.0, 0.0, 100.0), 100.0);
/// assert_eq!(clamp(f64::NAN, -10.0, 10.0), -10.0);
/// ```
#[must_use]
pub const fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Bound `value` to the unit interval.
#[must_use]
pub const fn clamp_unit(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

/// Round to one decimal place, the precision used for reported percentages.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "decimal rounding scales around the integer rounding step"
)]
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "decimal rounding scales around the integer rounding step"
)]
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
