//! The eight suitability factors, their weights and their response curves.
//!
//! Each scorer is a pure function of raw measurements returning a value in
//! `0.0..=1.0`. The weight table is fixed and sums to one.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::normalise::{clamp, clamp_unit, gaussian, round_tenths, sigmoid};

/// Land required per kilowatt of installed capacity, in square metres.
pub const LAND_PER_KW_M2: f64 = 8.0;

/// One of the eight environmental factors feeding the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Factor {
    /// Solar irradiance (kWh/m²/day).
    Solar,
    /// Ambient temperature (°C).
    Temperature,
    /// Site elevation (m).
    Elevation,
    /// Wind speed (m/s).
    Wind,
    /// Cloud cover (%).
    Cloud,
    /// Terrain slope (degrees).
    Slope,
    /// Distance to the electrical grid (km).
    Grid,
    /// Feasibility of the requested plant capacity.
    PlantSize,
}

impl Factor {
    /// Every factor in weight-table order.
    pub const ALL: [Self; 8] = [
        Self::Solar,
        Self::Temperature,
        Self::Elevation,
        Self::Wind,
        Self::Cloud,
        Self::Slope,
        Self::Grid,
        Self::PlantSize,
    ];

    /// Fixed contribution of this factor to the composite score.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Solar => 0.30,
            Self::Grid => 0.12,
            Self::Wind => 0.08,
            Self::Temperature | Self::Elevation | Self::Cloud | Self::Slope | Self::PlantSize => {
                0.10
            }
        }
    }

    /// Stable snake-case identifier.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Temperature => "temperature",
            Self::Elevation => "elevation",
            Self::Wind => "wind",
            Self::Cloud => "cloud",
            Self::Slope => "slope",
            Self::Grid => "grid",
            Self::PlantSize => "plant_size",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Normalised score for each of the eight factors.
///
/// # Examples
/// ```
/// use sitescore_core::{Factor, FactorScores};
///
/// let scores = FactorScores::uniform(1.0);
/// assert!((scores.weighted_sum() - 1.0).abs() < 1e-9);
/// assert_eq!(scores.get(Factor::Slope), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactorScores {
    /// Solar irradiance score.
    pub solar: f64,
    /// Temperature score.
    pub temperature: f64,
    /// Elevation score.
    pub elevation: f64,
    /// Wind speed score.
    pub wind: f64,
    /// Cloud cover score.
    pub cloud: f64,
    /// Terrain slope score.
    pub slope: f64,
    /// Grid proximity score.
    pub grid: f64,
    /// Plant-size feasibility score.
    pub plant_size: f64,
}

impl FactorScores {
    /// Assign the same score to every factor.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            solar: value,
            temperature: value,
            elevation: value,
            wind: value,
            cloud: value,
            slope: value,
            grid: value,
            plant_size: value,
        }
    }

    /// Score of a single factor.
    #[must_use]
    pub const fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Solar => self.solar,
            Factor::Temperature => self.temperature,
            Factor::Elevation => self.elevation,
            Factor::Wind => self.wind,
            Factor::Cloud => self.cloud,
            Factor::Slope => self.slope,
            Factor::Grid => self.grid,
            Factor::PlantSize => self.plant_size,
        }
    }

    /// Iterate `(factor, score)` pairs in weight-table order.
    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::ALL.into_iter().map(|factor| (factor, self.get(factor)))
    }

    /// Rescale every score to a `0.0..=100.0` percentage with one decimal,
    /// the form reported to callers.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "scores are scaled to percent")]
    pub fn to_percentages(&self) -> Self {
        let percent = |value: f64| round_tenths(value * 100.0);
        Self {
            solar: percent(self.solar),
            temperature: percent(self.temperature),
            elevation: percent(self.elevation),
            wind: percent(self.wind),
            cloud: percent(self.cloud),
            slope: percent(self.slope),
            grid: percent(self.grid),
            plant_size: percent(self.plant_size),
        }
    }

    /// Weighted combination of all factors, in `0.0..=1.0` when every score
    /// is normalised.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "the composite is a weighted sum"
    )]
    pub fn weighted_sum(&self) -> f64 {
        self.iter()
            .map(|(factor, score)| factor.weight() * score)
            .sum()
    }
}

/// Solar irradiance: bell curve around 5.5 kWh/m²/day.
#[must_use]
pub fn score_solar(irradiance: f64) -> f64 {
    gaussian(irradiance, 5.5, 1.8)
}

/// Temperature: bell curve around 22 °C.
#[must_use]
pub fn score_temperature(temperature_c: f64) -> f64 {
    gaussian(temperature_c, 22.0, 12.0)
}

/// Elevation: bell curve around 600 m blended with a low-altitude floor so
/// flat coastal plains keep a reasonable score.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the elevation curve blends two weighted components"
)]
pub fn score_elevation(elevation_m: f64) -> f64 {
    let peak = gaussian(elevation_m, 600.0, 700.0);
    let floor = clamp(sigmoid(elevation_m, 50.0, 0.008), 0.0, 0.55);
    clamp_unit(0.65 * peak + 0.35 * floor)
}

/// Wind: bell curve around 3.5 m/s, rewarding gentle convective cooling.
#[must_use]
pub fn score_wind(wind_speed: f64) -> f64 {
    gaussian(wind_speed, 3.5, 3.0)
}

/// Cloud cover: logistic on clear-sky percentage; less cloud is always
/// better.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "cloud cover is inverted to clear sky")]
pub fn score_cloud(cloud_cover_pct: f64) -> f64 {
    sigmoid(100.0 - cloud_cover_pct, 50.0, 0.06)
}

/// Terrain slope: step function over mounting difficulty bands.
///
/// # Examples
/// ```
/// use sitescore_core::factor::score_slope;
///
/// assert_eq!(score_slope(4.99), 1.0);
/// assert_eq!(score_slope(5.0), 0.65);
/// assert_eq!(score_slope(25.0), 0.05);
/// ```
#[must_use]
pub const fn score_slope(slope_deg: f64) -> f64 {
    if slope_deg < 5.0 {
        1.0
    } else if slope_deg < 15.0 {
        0.65
    } else if slope_deg < 25.0 {
        0.30
    } else {
        0.05
    }
}

/// Grid proximity: linear decay reaching zero at 50 km.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "linear distance decay")]
pub fn score_grid(distance_km: f64) -> f64 {
    clamp_unit(1.0 - distance_km / 50.0)
}

/// Plant-size feasibility: share of the required land that is available,
/// blended with irradiance viability.
///
/// A missing or non-positive `available_area_m2` is treated as exactly the
/// required area.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "feasibility blends an area ratio with an irradiance curve"
)]
pub fn score_plant_size(plant_kw: f64, available_area_m2: Option<f64>, irradiance: f64) -> f64 {
    let required = plant_kw * LAND_PER_KW_M2;
    let area_ratio = match available_area_m2 {
        Some(available) if available > 0.0 && required > 0.0 => clamp_unit(available / required),
        _ => 1.0,
    };
    let viability = sigmoid(irradiance, 3.5, 1.2);
    clamp_unit(0.6 * area_ratio + 0.4 * viability)
}
