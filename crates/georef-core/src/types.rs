//! Shared types for the georeferencing core.

use serde::{Deserialize, Serialize};

use crate::error::DigitizeError;
use crate::winding;

/// A 2D point in image (pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A geographic coordinate in the session's coordinate system.
///
/// No projection math is performed on these values; `lon`/`lat` are
/// simply the horizontal and vertical axes of whatever reference system
/// the user typed or imported them in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Easting / longitude.
    pub lon: f64,
    /// Northing / latitude.
    pub lat: f64,
}

impl GeoCoord {
    /// Create a new geographic coordinate.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A location whose pixel position is known and whose geographic
/// coordinate may have been assigned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    id: u32,
    pixel: Point,
    geo: Option<GeoCoord>,
}

impl ControlPoint {
    pub(crate) const fn new(id: u32, pixel: Point) -> Self {
        Self {
            id,
            pixel,
            geo: None,
        }
    }

    /// Build a fully assigned control point.
    ///
    /// Useful for callers that fit a transform from an external list of
    /// correspondences without going through a
    /// [`ControlPointStore`](crate::ControlPointStore).
    #[must_use]
    pub const fn with_geo(id: u32, pixel: Point, geo: GeoCoord) -> Self {
        Self {
            id,
            pixel,
            geo: Some(geo),
        }
    }

    /// Stable identifier, assigned in creation order.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Pixel position, fixed at creation.
    #[must_use]
    pub const fn pixel(&self) -> Point {
        self.pixel
    }

    /// Assigned geographic coordinate, if any.
    #[must_use]
    pub const fn geo(&self) -> Option<GeoCoord> {
        self.geo
    }

    /// Returns `true` once a geographic coordinate has been assigned.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.geo.is_some()
    }

    pub(crate) const fn set_geo(&mut self, geo: GeoCoord) {
        self.geo = Some(geo);
    }
}

/// A single closed boundary in pixel space.
///
/// Stored as an open polyline: the closing edge from the last vertex
/// back to the first is implied. Use [`closed_points`](Self::closed_points)
/// when a format needs the first vertex repeated.
///
/// # Invariants
///
/// - at least 3 vertices
/// - no two consecutive vertices are equal (including last→first)
/// - non-zero enclosed area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Ring(Vec<Point>);

impl Ring {
    /// Minimum number of distinct vertices in a ring.
    pub const MIN_VERTICES: usize = 3;

    /// Validate and build a ring from its vertices.
    ///
    /// A trailing vertex equal to the first is treated as an explicit
    /// closure and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DigitizeError::DuplicateVertex`] if two consecutive
    /// vertices coincide, and [`DigitizeError::DegenerateRing`] if fewer
    /// than [`MIN_VERTICES`](Self::MIN_VERTICES) remain or the vertices
    /// enclose no area.
    pub fn new(mut points: Vec<Point>) -> Result<Self, DigitizeError> {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if let Some(dup) = points.windows(2).find(|w| w[0] == w[1]) {
            return Err(DigitizeError::DuplicateVertex {
                x: dup[0].x,
                y: dup[0].y,
            });
        }
        if points.len() < Self::MIN_VERTICES || winding::is_degenerate(&points) {
            return Err(DigitizeError::DegenerateRing {
                vertices: points.len(),
            });
        }
        Ok(Self(points))
    }

    /// Number of stored (distinct) vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The stored vertices, without the implied closing vertex.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Vertices with the first one repeated at the end.
    pub fn closed_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.0.iter().copied().chain(self.0.first().copied())
    }
}

impl TryFrom<Vec<Point>> for Ring {
    type Error = DigitizeError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Ring> for Vec<Point> {
    fn from(ring: Ring) -> Self {
        ring.0
    }
}

/// A finalized, named polygon made of one or more rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    id: u32,
    name: String,
    rings: Vec<Ring>,
}

impl Polygon {
    /// Build a polygon from already-validated rings.
    ///
    /// # Errors
    ///
    /// Returns [`DigitizeError::EmptyPolygon`] if `rings` is empty.
    pub fn new(id: u32, name: impl Into<String>, rings: Vec<Ring>) -> Result<Self, DigitizeError> {
        if rings.is_empty() {
            return Err(DigitizeError::EmptyPolygon);
        }
        Ok(Self {
            id,
            name: name.into(),
            rings,
        })
    }

    /// Sequential identifier assigned at finalization (starting at 1).
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Display name, fixed at finalization.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rings in the order they were closed.
    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Total number of stored vertices across all rings.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Ring::len).sum()
    }
}
