//! Validated site polygons.
#![forbid(unsafe_code)]

use geo::{BoundingRect, Coord, LineString, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Mean Earth radius used for area estimates, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A simple polygon in WGS84 (`x = longitude`, `y = latitude`).
///
/// The ring is implicitly closed; the first vertex must not be repeated.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescore_grid::SitePolygon;
///
/// let polygon = SitePolygon::new(vec![
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.01, y: 0.0 },
///     Coord { x: 0.01, y: 0.01 },
///     Coord { x: 0.0, y: 0.01 },
/// ])?;
/// assert!(polygon.contains(Coord { x: 0.005, y: 0.005 }));
/// assert!(!polygon.contains(Coord { x: 0.02, y: 0.005 }));
/// # Ok::<(), sitescore_grid::GeometryError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Coord<f64>>", into = "Vec<Coord<f64>>"))]
pub struct SitePolygon {
    vertices: Vec<Coord<f64>>,
}

impl SitePolygon {
    /// Validate and wrap a vertex ring.
    ///
    /// # Errors
    /// Returns [`GeometryError`] when fewer than three vertices are given or
    /// any vertex is non-finite or outside the WGS84 range.
    pub fn new(vertices: Vec<Coord<f64>>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices {
                count: vertices.len(),
            });
        }
        for (index, vertex) in vertices.iter().enumerate() {
            if !vertex.x.is_finite() || !vertex.y.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { index });
            }
            if !(-90.0..=90.0).contains(&vertex.y) || !(-180.0..=180.0).contains(&vertex.x) {
                return Err(GeometryError::OutOfRange {
                    index,
                    lat: vertex.y,
                    lng: vertex.x,
                });
            }
        }
        Ok(Self { vertices })
    }

    /// The vertex ring.
    #[must_use]
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Arithmetic mean of the vertices.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "the centroid averages a small vertex list"
    )]
    pub fn centroid(&self) -> Coord<f64> {
        let count = self.vertices.len() as f64;
        let sum = self
            .vertices
            .iter()
            .fold(Coord { x: 0.0, y: 0.0 }, |acc, vertex| acc + *vertex);
        Coord {
            x: sum.x / count,
            y: sum.y / count,
        }
    }

    /// Axis-aligned bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect<f64> {
        let centroid = self.centroid();
        LineString::from(self.vertices.clone())
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(centroid, centroid))
    }

    /// Approximate surface area in square metres using the spherical excess
    /// of the ring.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "spherical excess is accumulated edge by edge"
    )]
    pub fn area_m2(&self) -> f64 {
        let total: f64 = self
            .edges()
            .map(|(start, end)| {
                (end.x - start.x).to_radians()
                    * (2.0 + start.y.to_radians().sin() + end.y.to_radians().sin())
            })
            .sum();
        (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
    }

    /// Even-odd ray-casting containment test.
    ///
    /// Points lying exactly on an edge may report either answer.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "edge crossings are interpolated")]
    pub fn contains(&self, point: Coord<f64>) -> bool {
        let mut inside = false;
        for (previous, current) in self.edges() {
            if (current.y > point.y) != (previous.y > point.y) {
                let crossing = (previous.x - current.x) * (point.y - current.y)
                    / (previous.y - current.y)
                    + current.x;
                if point.x < crossing {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Consecutive vertex pairs, closing the ring.
    fn edges(&self) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
        let closing = self.vertices.last().copied();
        closing
            .into_iter()
            .chain(self.vertices.iter().copied())
            .zip(self.vertices.iter().copied())
    }
}

impl TryFrom<Vec<Coord<f64>>> for SitePolygon {
    type Error = GeometryError;

    fn try_from(vertices: Vec<Coord<f64>>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<SitePolygon> for Vec<Coord<f64>> {
    fn from(polygon: SitePolygon) -> Self {
        polygon.vertices
    }
}
