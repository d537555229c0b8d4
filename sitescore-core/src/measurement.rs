//! Raw environmental measurements for a candidate site.
//!
//! Only irradiance, wind and elevation are mandatory. Every other input has a
//! documented fallback applied by [`SiteMeasurements::resolve`].

use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::factor::LAND_PER_KW_M2;

/// Latitude assumed when the caller supplies no location.
pub const DEFAULT_LATITUDE: f64 = 20.0;
/// Cloud cover assumed when missing (%).
pub const DEFAULT_CLOUD_COVER_PCT: f64 = 40.0;
/// Terrain slope assumed when missing (degrees).
pub const DEFAULT_SLOPE_DEG: f64 = 3.0;
/// Grid distance assumed when missing (km).
pub const DEFAULT_GRID_DISTANCE_KM: f64 = 15.0;
/// Plant capacity assumed when missing (kW).
pub const DEFAULT_PLANT_CAPACITY_KW: f64 = 10.0;
/// Relative humidity assumed when missing (%).
pub const DEFAULT_HUMIDITY_PCT: f64 = 55.0;

/// Environmental inputs for one site.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_core::SiteMeasurements;
///
/// let site = SiteMeasurements::new(5.5, 3.5, 600.0)
///     .at(Coord { x: 72.6, y: 26.9 })
///     .with_cloud_cover(30.0);
/// let resolved = site.resolve();
/// assert_eq!(resolved.cloud_cover_pct, 30.0);
/// assert_eq!(resolved.slope_deg, 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SiteMeasurements {
    /// Site location, when known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Coord<f64>>,
    /// Mean global horizontal irradiance (kWh/m²/day).
    pub solar_irradiance: f64,
    /// Mean wind speed (m/s).
    pub wind_speed: f64,
    /// Elevation above sea level (m).
    pub elevation_m: f64,
    /// Mean air temperature (°C).
    #[cfg_attr(feature = "serde", serde(default))]
    pub temperature_c: Option<f64>,
    /// Relative humidity (%).
    #[cfg_attr(feature = "serde", serde(default))]
    pub humidity_pct: Option<f64>,
    /// Mean cloud cover (%).
    #[cfg_attr(feature = "serde", serde(default))]
    pub cloud_cover_pct: Option<f64>,
    /// Terrain slope (degrees).
    #[cfg_attr(feature = "serde", serde(default))]
    pub slope_deg: Option<f64>,
    /// Distance to the nearest grid connection point (km).
    #[cfg_attr(feature = "serde", serde(default))]
    pub grid_distance_km: Option<f64>,
    /// Requested plant capacity (kW).
    #[cfg_attr(feature = "serde", serde(default))]
    pub plant_capacity_kw: Option<f64>,
    /// Land available for the installation (m²).
    #[cfg_attr(feature = "serde", serde(default))]
    pub available_area_m2: Option<f64>,
}

impl SiteMeasurements {
    /// Build a measurement set from the three mandatory inputs.
    #[must_use]
    pub const fn new(solar_irradiance: f64, wind_speed: f64, elevation_m: f64) -> Self {
        Self {
            location: None,
            solar_irradiance,
            wind_speed,
            elevation_m,
            temperature_c: None,
            humidity_pct: None,
            cloud_cover_pct: None,
            slope_deg: None,
            grid_distance_km: None,
            plant_capacity_kw: None,
            available_area_m2: None,
        }
    }

    /// Attach the site location.
    #[must_use]
    pub const fn at(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the mean temperature.
    #[must_use]
    pub const fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_c = Some(celsius);
        self
    }

    /// Set the relative humidity.
    #[must_use]
    pub const fn with_humidity(mut self, pct: f64) -> Self {
        self.humidity_pct = Some(pct);
        self
    }

    /// Set the cloud cover.
    #[must_use]
    pub const fn with_cloud_cover(mut self, pct: f64) -> Self {
        self.cloud_cover_pct = Some(pct);
        self
    }

    /// Set the terrain slope.
    #[must_use]
    pub const fn with_slope(mut self, degrees: f64) -> Self {
        self.slope_deg = Some(degrees);
        self
    }

    /// Set the grid distance.
    #[must_use]
    pub const fn with_grid_distance(mut self, km: f64) -> Self {
        self.grid_distance_km = Some(km);
        self
    }

    /// Set the requested plant capacity.
    #[must_use]
    pub const fn with_plant_capacity(mut self, kw: f64) -> Self {
        self.plant_capacity_kw = Some(kw);
        self
    }

    /// Set the available land area.
    #[must_use]
    pub const fn with_available_area(mut self, m2: f64) -> Self {
        self.available_area_m2 = Some(m2);
        self
    }

    /// Latitude of the site, or [`DEFAULT_LATITUDE`] when unknown.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.location.map_or(DEFAULT_LATITUDE, |coord| coord.y)
    }

    /// Replace every missing optional input with its fallback.
    ///
    /// Temperature falls back to [`estimate_temperature`] for the site
    /// latitude; the available area falls back to twice the land required by
    /// the plant capacity.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "the area fallback scales the plant footprint"
    )]
    pub fn resolve(&self) -> ResolvedMeasurements {
        let latitude = self.latitude();
        let plant_capacity_kw = self
            .plant_capacity_kw
            .unwrap_or(DEFAULT_PLANT_CAPACITY_KW);
        ResolvedMeasurements {
            location: self.location,
            latitude,
            solar_irradiance: self.solar_irradiance,
            wind_speed: self.wind_speed,
            elevation_m: self.elevation_m,
            temperature_c: self
                .temperature_c
                .unwrap_or_else(|| estimate_temperature(latitude)),
            humidity_pct: self.humidity_pct.unwrap_or(DEFAULT_HUMIDITY_PCT),
            cloud_cover_pct: self.cloud_cover_pct.unwrap_or(DEFAULT_CLOUD_COVER_PCT),
            slope_deg: self.slope_deg.unwrap_or(DEFAULT_SLOPE_DEG),
            grid_distance_km: self.grid_distance_km.unwrap_or(DEFAULT_GRID_DISTANCE_KM),
            plant_capacity_kw,
            available_area_m2: self
                .available_area_m2
                .unwrap_or(plant_capacity_kw * LAND_PER_KW_M2 * 2.0),
        }
    }
}

/// Measurement set with every fallback applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMeasurements {
    /// Site location, when known.
    pub location: Option<Coord<f64>>,
    /// Latitude used for latitude-derived fallbacks.
    pub latitude: f64,
    /// Mean global horizontal irradiance (kWh/m²/day).
    pub solar_irradiance: f64,
    /// Mean wind speed (m/s).
    pub wind_speed: f64,
    /// Elevation above sea level (m).
    pub elevation_m: f64,
    /// Mean air temperature (°C).
    pub temperature_c: f64,
    /// Relative humidity (%).
    pub humidity_pct: f64,
    /// Mean cloud cover (%).
    pub cloud_cover_pct: f64,
    /// Terrain slope (degrees).
    pub slope_deg: f64,
    /// Distance to the nearest grid connection point (km).
    pub grid_distance_km: f64,
    /// Requested plant capacity (kW).
    pub plant_capacity_kw: f64,
    /// Land available for the installation (m²).
    pub available_area_m2: f64,
}

/// Climatological mean temperature by absolute latitude band.
///
/// # Examples
/// ```
/// use sitescore_core::measurement::estimate_temperature;
///
/// assert_eq!(estimate_temperature(-8.0), 28.0);
/// assert_eq!(estimate_temperature(45.0), 10.0);
/// ```
#[must_use]
pub const fn estimate_temperature(latitude: f64) -> f64 {
    let band = latitude.abs();
    if band <= 10.0 {
        28.0
    } else if band <= 20.0 {
        26.0
    } else if band <= 30.0 {
        24.0
    } else if band <= 40.0 {
        18.0
    } else if band <= 50.0 {
        10.0
    } else if band <= 60.0 {
        4.0
    } else {
        -5.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn resolve_fills_fixed_defaults() {
        let resolved = SiteMeasurements::new(5.0, 3.0, 200.0).resolve();
        assert_eq!(resolved.latitude, DEFAULT_LATITUDE);
        assert_eq!(resolved.temperature_c, 26.0);
        assert_eq!(resolved.humidity_pct, DEFAULT_HUMIDITY_PCT);
        assert_eq!(resolved.cloud_cover_pct, DEFAULT_CLOUD_COVER_PCT);
        assert_eq!(resolved.grid_distance_km, DEFAULT_GRID_DISTANCE_KM);
        assert_eq!(resolved.plant_capacity_kw, DEFAULT_PLANT_CAPACITY_KW);
        assert_eq!(resolved.available_area_m2, 160.0);
    }

    #[rstest]
    fn resolve_derives_temperature_from_location() {
        let resolved = SiteMeasurements::new(3.0, 4.0, 50.0)
            .at(Coord { x: 10.0, y: 52.5 })
            .resolve();
        assert_eq!(resolved.temperature_c, 4.0);
    }

    #[rstest]
    fn explicit_values_win_over_defaults() {
        let resolved = SiteMeasurements::new(5.0, 3.0, 200.0)
            .with_temperature(31.0)
            .with_plant_capacity(50.0)
            .resolve();
        assert_eq!(resolved.temperature_c, 31.0);
        assert_eq!(resolved.available_area_m2, 800.0);
    }

    #[rstest]
    #[case(0.0, 28.0)]
    #[case(10.0, 28.0)]
    #[case(-25.0, 24.0)]
    #[case(35.0, 18.0)]
    #[case(75.0, -5.0)]
    fn temperature_bands(#[case] latitude: f64, #[case] expected: f64) {
        assert_eq!(estimate_temperature(latitude), expected);
    }
}
