//! Least-squares affine estimation from control points.
//!
//! The two output axes are independent linear models sharing the same
//! design matrix:
//!
//! ```text
//! lon = a*px + b*py + c
//! lat = d*px + e*py + f
//! ```
//!
//! Both are solved by ordinary least squares over all complete control
//! points, weighted equally. Coordinates are centred on their means
//! before the normal equations are formed, which removes the intercept
//! from the system and leaves a 2×2 scatter matrix shared by both axes.
//! With exactly three points the fit is exact.
//!
//! The result is a pure function of the input: no iteration, no
//! randomness, no outlier rejection.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::affine::AffineTransform;
use crate::config::GeorefConfig;
use crate::error::EstimateError;
use crate::types::{ControlPoint, GeoCoord, Point};

/// Minimum number of complete control points needed for a fit.
pub const MIN_POINTS: usize = 3;

/// Least-squares affine estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineEstimator {
    collinearity_tolerance: f64,
}

impl Default for AffineEstimator {
    fn default() -> Self {
        Self::new(GeorefConfig::DEFAULT_COLLINEARITY_TOLERANCE)
    }
}

impl AffineEstimator {
    /// Create an estimator with an explicit collinearity tolerance.
    ///
    /// The point set is rejected as collinear when the determinant of the
    /// centred scatter matrix is at most `tolerance * Sxx * Syy`, i.e.
    /// when the squared correlation between pixel x and y is within
    /// `tolerance` of 1.
    #[must_use]
    pub const fn new(collinearity_tolerance: f64) -> Self {
        Self {
            collinearity_tolerance,
        }
    }

    /// Create an estimator using the tolerance from `config`.
    #[must_use]
    pub const fn from_config(config: &GeorefConfig) -> Self {
        Self::new(config.collinearity_tolerance)
    }

    /// Fit an affine transform to every point in `points` that has a
    /// geographic coordinate. Points without one are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::InsufficientPoints`] with fewer than
    /// [`MIN_POINTS`] complete points, and
    /// [`EstimateError::DegenerateGeometry`] when the pixel positions are
    /// collinear or the inputs are not finite.
    pub fn estimate(&self, points: &[ControlPoint]) -> Result<AffineTransform, EstimateError> {
        let pairs: Vec<(Point, GeoCoord)> = points
            .iter()
            .filter_map(|cp| cp.geo().map(|g| (cp.pixel(), g)))
            .collect();
        if pairs.len() < MIN_POINTS {
            return Err(EstimateError::InsufficientPoints {
                needed: MIN_POINTS,
                got: pairs.len(),
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|(p, _)| p.x).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|(p, _)| p.y).sum::<f64>() / n;
        let mean_lon = pairs.iter().map(|(_, g)| g.lon).sum::<f64>() / n;
        let mean_lat = pairs.iter().map(|(_, g)| g.lat).sum::<f64>() / n;

        // Centred scatter matrix and cross terms for each output axis.
        let mut scatter = Matrix2::<f64>::zeros();
        let mut rhs_lon = Vector2::<f64>::zeros();
        let mut rhs_lat = Vector2::<f64>::zeros();
        for (p, g) in &pairs {
            let v = Vector2::new(p.x - mean_x, p.y - mean_y);
            scatter += v * v.transpose();
            rhs_lon += v * (g.lon - mean_lon);
            rhs_lat += v * (g.lat - mean_lat);
        }

        let (sxx, syy) = (scatter[(0, 0)], scatter[(1, 1)]);
        let det = scatter.determinant();
        if !(det > self.collinearity_tolerance * sxx * syy) {
            log::debug!("rejecting {} control points as collinear (det={det:e})", pairs.len());
            return Err(EstimateError::DegenerateGeometry);
        }

        let lu = scatter.lu();
        let ab = lu.solve(&rhs_lon).ok_or(EstimateError::DegenerateGeometry)?;
        let de = lu.solve(&rhs_lat).ok_or(EstimateError::DegenerateGeometry)?;

        let (a, b) = (ab[0], ab[1]);
        let (d, e) = (de[0], de[1]);
        let c = mean_lon - a.mul_add(mean_x, b * mean_y);
        let f = mean_lat - d.mul_add(mean_x, e * mean_y);

        let transform = AffineTransform::new(a, b, c, d, e, f);
        if !transform.coefficients().iter().all(|v| v.is_finite()) {
            return Err(EstimateError::DegenerateGeometry);
        }
        log::debug!("estimated affine transform from {} points: {transform:?}", pairs.len());
        Ok(transform)
    }
}

/// Fit an affine transform with the default collinearity tolerance.
///
/// # Errors
///
/// See [`AffineEstimator::estimate`].
pub fn estimate(points: &[ControlPoint]) -> Result<AffineTransform, EstimateError> {
    AffineEstimator::default().estimate(points)
}

/// How far one control point lies from the fitted transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    /// Control point id.
    pub id: u32,
    /// Assigned minus predicted longitude.
    pub d_lon: f64,
    /// Assigned minus predicted latitude.
    pub d_lat: f64,
    /// Euclidean length of `(d_lon, d_lat)`.
    pub error: f64,
}

/// Per-point residuals and root-mean-square error of a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// One entry per complete control point, in creation order.
    pub residuals: Vec<Residual>,
    /// Root-mean-square of the residual errors.
    pub rmse: f64,
}

impl FitReport {
    /// Evaluate `transform` against every complete point in `points`.
    #[must_use]
    pub fn compute(transform: &AffineTransform, points: &[ControlPoint]) -> Self {
        let residuals: Vec<Residual> = points
            .iter()
            .filter_map(|cp| {
                let geo = cp.geo()?;
                let predicted = transform.apply(cp.pixel());
                let d_lon = geo.lon - predicted.lon;
                let d_lat = geo.lat - predicted.lat;
                Some(Residual {
                    id: cp.id(),
                    d_lon,
                    d_lat,
                    error: d_lon.hypot(d_lat),
                })
            })
            .collect();

        let rmse = if residuals.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = residuals.len() as f64;
            (residuals.iter().map(|r| r.error * r.error).sum::<f64>() / n).sqrt()
        };
        Self { residuals, rmse }
    }

    /// Sum of squared residual errors over both axes.
    #[must_use]
    pub fn sum_of_squares(&self) -> f64 {
        self.residuals.iter().map(|r| r.error * r.error).sum()
    }
}
