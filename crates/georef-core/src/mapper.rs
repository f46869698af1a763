//! Pixel ↔ geographic conversion through one owned affine transform.

use crate::affine::AffineTransform;
use crate::config::GeorefConfig;
use crate::error::MappingError;
use crate::types::{GeoCoord, Point};

/// Converts points between pixel and geographic space.
///
/// The mapper owns its transform. [`replace`](Self::replace) swaps it
/// wholesale; there is no way to edit coefficients in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    transform: AffineTransform,
    inverse: Option<AffineTransform>,
    singular_tolerance: f64,
}

impl CoordinateMapper {
    /// Wrap `transform` using the default singularity tolerance.
    #[must_use]
    pub fn new(transform: AffineTransform) -> Self {
        Self::with_tolerance(transform, GeorefConfig::DEFAULT_SINGULAR_TOLERANCE)
    }

    /// Wrap `transform`, treating it as non-invertible when
    /// `|det| <= singular_tolerance * (|a*e| + |b*d|)`.
    #[must_use]
    pub fn with_tolerance(transform: AffineTransform, singular_tolerance: f64) -> Self {
        Self {
            inverse: transform.inverse(singular_tolerance),
            transform,
            singular_tolerance,
        }
    }

    /// The wrapped transform.
    #[must_use]
    pub const fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// Replace the wrapped transform. Subsequent calls use the new one.
    pub fn replace(&mut self, transform: AffineTransform) {
        *self = Self::with_tolerance(transform, self.singular_tolerance);
    }

    /// Forward mapping.
    #[must_use]
    pub fn pixel_to_geo(&self, pixel: Point) -> GeoCoord {
        self.transform.apply(pixel)
    }

    /// Inverse mapping.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NonInvertibleTransform`] if the transform's
    /// linear part is singular.
    pub fn geo_to_pixel(&self, geo: GeoCoord) -> Result<Point, MappingError> {
        let inverse = self
            .inverse
            .ok_or_else(|| MappingError::NonInvertibleTransform {
                determinant: self.transform.determinant(),
            })?;
        let p = inverse.apply(Point::new(geo.lon, geo.lat));
        Ok(Point::new(p.lon, p.lat))
    }

    /// Nominal pixel resolution `(a, e)`; `e` is signed.
    #[must_use]
    pub const fn pixel_size(&self) -> (f64, f64) {
        self.transform.pixel_size()
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn invertible_transform() -> impl Strategy<Value = AffineTransform> {
        (
            -10.0f64..10.0,
            -10.0f64..10.0,
            -1e5f64..1e5,
            -10.0f64..10.0,
            -10.0f64..10.0,
            -1e5f64..1e5,
        )
            .prop_map(|(a, b, c, d, e, f)| AffineTransform::new(a, b, c, d, e, f))
            .prop_filter("well-conditioned", |t| {
                let [a, b, _, d, e, _] = t.coefficients();
                let det = t.determinant().abs();
                det > 1.0 && det > 1e-2 * (a * e).abs().max((b * d).abs())
            })
    }

    proptest! {
        /// Property: geo → pixel → geo returns the starting coordinate.
        #[test]
        fn prop_geo_round_trip(
            t in invertible_transform(),
            lon in -1e5f64..1e5,
            lat in -1e5f64..1e5,
        ) {
            let m = CoordinateMapper::new(t);
            let back = m.pixel_to_geo(m.geo_to_pixel(GeoCoord::new(lon, lat)).unwrap());
            let scale = 1.0 + lon.abs().max(lat.abs());
            prop_assert!((back.lon - lon).abs() < 1e-6 * scale);
            prop_assert!((back.lat - lat).abs() < 1e-6 * scale);
        }

        /// Property: pixel → geo → pixel returns the starting pixel.
        #[test]
        fn prop_pixel_round_trip(
            t in invertible_transform(),
            x in 0.0f64..10_000.0,
            y in 0.0f64..10_000.0,
        ) {
            let m = CoordinateMapper::new(t);
            let back = m.geo_to_pixel(m.pixel_to_geo(Point::new(x, y))).unwrap();
            prop_assert!((back.x - x).abs() < 1e-6);
            prop_assert!((back.y - y).abs() < 1e-6);
        }
    }
}
