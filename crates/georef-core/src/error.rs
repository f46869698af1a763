//! Error types for every georeferencing stage.
//!
//! Each component reports its own enum so callers can match on exactly
//! the failures an operation can produce. [`SessionError`] wraps them all
//! for the command layer.
//!
//! Every operation that returns one of these errors leaves its state
//! untouched: validation always happens before mutation.

use serde::{Deserialize, Serialize};

/// Errors from the control point store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ControlPointError {
    /// No control point has this id.
    #[error("unknown control point id {0}")]
    UnknownPoint(u32),

    /// An imported row could not be read as numbers.
    #[error("malformed row {row}: {reason}")]
    MalformedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Row and point counts differ under the strict import policy.
    #[error("row count {rows} does not match control point count {points}")]
    CountMismatch {
        /// Number of rows supplied.
        rows: usize,
        /// Number of control points in the store.
        points: usize,
    },

    /// A typed pixel position is NaN or infinite.
    #[error("pixel coordinates must be finite numbers")]
    NonFinitePixel,

    /// A typed geographic coordinate is NaN or infinite.
    #[error("longitude and latitude for point {id} must be finite numbers")]
    NonFiniteGeo {
        /// The point the coordinate was meant for.
        id: u32,
    },

    /// Nearest-pixel import needs at least one existing point.
    #[error("no control points to match imported rows against")]
    NoPoints,
}

/// Errors from affine estimation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum EstimateError {
    /// Fewer than three points carry a geographic coordinate.
    #[error("need at least {needed} control points with coordinates, got {got}")]
    InsufficientPoints {
        /// Minimum number of complete points.
        needed: usize,
        /// Number of complete points supplied.
        got: usize,
    },

    /// The pixel positions are collinear (or coincident), so no unique
    /// affine transform exists.
    #[error("control points are collinear in pixel space; cannot compute transformation")]
    DegenerateGeometry,
}

/// Errors from the coordinate mapper.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum MappingError {
    /// The linear part of the transform has (near-)zero determinant.
    #[error("transform is not invertible (determinant {determinant:e})")]
    NonInvertibleTransform {
        /// Determinant of `[[a, b], [d, e]]`.
        determinant: f64,
    },
}

/// Errors from the polygon digitizer.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum DigitizeError {
    /// A ring needs at least three distinct, non-collinear vertices.
    #[error("ring has {vertices} usable vertices; at least 3 non-collinear are required")]
    DegenerateRing {
        /// Number of distinct vertices the ring would have had.
        vertices: usize,
    },

    /// The vertex equals the previous one.
    #[error("duplicate vertex at ({x}, {y})")]
    DuplicateVertex {
        /// Pixel x of the rejected vertex.
        x: f64,
        /// Pixel y of the rejected vertex.
        y: f64,
    },

    /// `finalize_polygon` was called with no closed ring pending.
    #[error("polygon has no closed rings")]
    EmptyPolygon,

    /// `delete_last_polygon` was called with no finalized polygons.
    #[error("no polygons to delete")]
    NothingToDelete,

    /// A drawing operation was issued before `start_polygon`.
    #[error("no polygon has been started")]
    NoActivePolygon,

    /// `start_polygon` was issued while a polygon still has geometry.
    #[error("a polygon is already in progress; finalize or cancel it first")]
    PolygonInProgress,

    /// The current ring has vertices that have not been closed yet.
    #[error("the current ring is still open; close it first")]
    RingInProgress,

    /// A vertex was added after closing a ring without starting a new one.
    #[error("the current ring is closed; start a new ring first")]
    RingClosed,

    /// Rectangle mode produces exactly one ring per polygon.
    #[error("rectangle mode does not support multiple rings")]
    MultiRingUnsupported,

    /// Point coordinates must be finite.
    #[error("vertex coordinates must be finite")]
    NonFiniteVertex,
}

/// Any error produced by a [`Session`](crate::Session) command.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum SessionError {
    /// Control point store failure.
    #[error(transparent)]
    ControlPoint(#[from] ControlPointError),

    /// Estimation failure.
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    /// Mapping failure.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Digitizing failure.
    #[error(transparent)]
    Digitize(#[from] DigitizeError),

    /// A geo conversion was requested before a transform was computed.
    #[error("no transformation has been computed")]
    NoTransform,
}
