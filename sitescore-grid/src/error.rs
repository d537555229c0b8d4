//! Errors raised for structurally invalid geometry.
#![forbid(unsafe_code)]

use thiserror::Error;

/// Reasons a polygon cannot be rasterised.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum GeometryError {
    /// A polygon needs at least three vertices.
    #[error("polygon must have at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },
    /// A vertex holds `NaN` or an infinite value.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the offending vertex.
        index: usize,
    },
    /// A vertex lies outside the WGS84 latitude or longitude range.
    #[error("vertex {index} at ({lat}, {lng}) is outside the valid coordinate range")]
    OutOfRange {
        /// Position of the offending vertex.
        index: usize,
        /// Vertex latitude.
        lat: f64,
        /// Vertex longitude.
        lng: f64,
    },
}
