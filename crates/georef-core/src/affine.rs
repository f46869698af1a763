//! The six-parameter affine transform between pixel and geographic space.

use serde::{Deserialize, Serialize};

use crate::types::{GeoCoord, Point};

/// Affine mapping from pixel `(px, py)` to geographic `(lon, lat)`:
///
/// ```text
/// lon = a*px + b*py + c
/// lat = d*px + e*py + f
/// ```
///
/// Immutable once built; a new estimate produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl AffineTransform {
    /// Build a transform from its coefficients in `a..f` order.
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Coefficients as `[a, b, c, d, e, f]`.
    #[must_use]
    pub const fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Apply the forward mapping.
    #[must_use]
    pub fn apply(&self, p: Point) -> GeoCoord {
        GeoCoord::new(
            self.a.mul_add(p.x, self.b.mul_add(p.y, self.c)),
            self.d.mul_add(p.x, self.e.mul_add(p.y, self.f)),
        )
    }

    /// Determinant of the linear part `[[a, b], [d, e]]`.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a.mul_add(self.e, -(self.b * self.d))
    }

    /// Returns `true` if the determinant is zero or negligible relative
    /// to the magnitude of its terms.
    #[must_use]
    pub fn is_singular(&self, tolerance: f64) -> bool {
        let det = self.determinant();
        let scale = (self.a * self.e).abs() + (self.b * self.d).abs();
        // Negated comparison so that NaN counts as singular.
        !(det.abs() > tolerance * scale) || !det.is_finite()
    }

    /// The inverse mapping, expressed as a transform from `(lon, lat)` to
    /// `(px, py)` with the same coefficient layout.
    ///
    /// Returns `None` if the transform is singular under `tolerance`.
    #[must_use]
    pub fn inverse(&self, tolerance: f64) -> Option<Self> {
        if self.is_singular(tolerance) {
            return None;
        }
        let det = self.determinant();
        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;
        let ic = -ia.mul_add(self.c, ib * self.f);
        let if_ = -id.mul_add(self.c, ie * self.f);
        Some(Self::new(ia, ib, ic, id, ie, if_))
    }

    /// Nominal pixel size `(a, e)` in geographic units.
    ///
    /// `e` keeps its sign, which is normally negative because image rows
    /// grow downwards while latitude grows upwards.
    #[must_use]
    pub const fn pixel_size(&self) -> (f64, f64) {
        (self.a, self.e)
    }

    /// Rotation terms `(b, d)`, zero for north-up images.
    #[must_use]
    pub const fn rotation(&self) -> (f64, f64) {
        (self.b, self.d)
    }

    /// Geographic position of the top-left corner of pixel `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> GeoCoord {
        GeoCoord::new(self.c, self.f)
    }
}
