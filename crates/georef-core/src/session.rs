//! One georeferencing session: control points, the fitted transform and
//! the digitized polygons, driven either through methods or through
//! serializable [`Command`]s.

use serde::{Deserialize, Serialize};

use crate::affine::AffineTransform;
use crate::config::GeorefConfig;
use crate::control::{ControlPointStore, ImportReport};
use crate::digitize::{ClickOutcome, DigitizingSession, DrawMode};
use crate::error::{ControlPointError, EstimateError, SessionError};
use crate::estimate::{AffineEstimator, FitReport, MIN_POINTS};
use crate::mapper::CoordinateMapper;
use crate::types::{GeoCoord, Point, Polygon};

/// Whether the session currently has a usable transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransformStatus {
    /// No transform has been computed, or it was dropped.
    Absent,
    /// The last estimate succeeded.
    Valid {
        /// Fitted transform.
        transform: AffineTransform,
        /// Root-mean-square residual of the fit.
        rmse: f64,
    },
    /// The last estimate failed. A previously fitted mapper, if any, is
    /// still in use.
    Invalid {
        /// Why the estimate failed.
        reason: EstimateError,
    },
}

/// One session operation in serializable form.
///
/// Serialized with an `op` tag, e.g. `{"op": "add_point", "x": 1, "y": 2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Place a control point at a pixel.
    AddPoint { x: f64, y: f64 },
    /// Set the geographic coordinate of one control point.
    AssignGeo { id: u32, lon: f64, lat: f64 },
    /// Assign `x,y` rows to points in creation order.
    ImportGeo { rows: Vec<Vec<String>> },
    /// Assign `col,row,x,y` rows to the nearest point.
    ImportGeoByPixel { rows: Vec<Vec<String>> },
    /// Remove the newest control point.
    RemoveLastPoint,
    /// Remove every control point.
    ClearPoints,
    /// Fit the affine transform from the complete control points.
    ComputeTransform,
    /// Convert a pixel to geographic coordinates.
    PixelToGeo { x: f64, y: f64 },
    /// Convert geographic coordinates to a pixel.
    GeoToPixel { lon: f64, lat: f64 },
    /// Begin a polygon.
    StartPolygon {
        #[serde(default)]
        mode: DrawMode,
    },
    /// Click in the image while digitizing.
    Click { x: f64, y: f64 },
    /// Close the open ring.
    CloseRing,
    /// Begin another ring in the active polygon.
    NewRing,
    /// Seal the active polygon.
    FinalizePolygon {
        #[serde(default)]
        name: String,
    },
    /// Remove the newest finalized polygon.
    DeleteLastPolygon,
    /// Discard the active polygon.
    CancelPolygon,
}

/// Result of a successfully applied [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A control point was placed with this id.
    PointAdded { id: u32 },
    /// The point's geographic coordinate was set.
    GeoAssigned { id: u32 },
    /// A CSV import finished; see the report for count mismatches.
    Imported { report: ImportReport },
    /// The newest point was removed, if there was one.
    PointRemoved { id: Option<u32> },
    /// Every control point was removed.
    PointsCleared,
    /// A new transform is in use.
    TransformComputed { transform: AffineTransform, rmse: f64 },
    /// Result of a pixel to geo conversion.
    Geo { coord: GeoCoord },
    /// Result of a geo to pixel conversion.
    Pixel { point: Point },
    /// A polygon is being digitized in `mode`.
    PolygonStarted { mode: DrawMode },
    /// A click was accepted.
    Clicked { result: ClickOutcome },
    /// The open ring was closed with this many vertices.
    RingClosed { vertices: usize },
    /// A further ring can be clicked.
    RingStarted,
    /// The active polygon was stored.
    PolygonFinalized { id: u32, name: String },
    /// The newest polygon was removed.
    PolygonDeleted { id: u32 },
    /// The active polygon was dropped; `discarded` is false if there was
    /// nothing to drop.
    PolygonCancelled { discarded: bool },
}

/// Display row for one finalized polygon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonSummary {
    /// Polygon id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Stored vertices over all rings.
    pub vertices: usize,
}

/// Explicit session state.
///
/// Owns exactly one control point store, one digitizer and at most one
/// coordinate mapper; nothing is shared between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    config: GeorefConfig,
    points: ControlPointStore,
    digitizer: DigitizingSession,
    mapper: Option<CoordinateMapper>,
    status: TransformStatus,
    fit: Option<FitReport>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GeorefConfig::default())
    }
}

impl Session {
    /// An empty session: no points, no polygons, no transform.
    #[must_use]
    pub fn new(config: GeorefConfig) -> Self {
        Self {
            config,
            points: ControlPointStore::new(),
            digitizer: DigitizingSession::new(),
            mapper: None,
            status: TransformStatus::Absent,
            fit: None,
        }
    }

    /// Settings the session was created with.
    #[must_use]
    pub const fn config(&self) -> &GeorefConfig {
        &self.config
    }

    /// Control points in creation order.
    #[must_use]
    pub const fn points(&self) -> &ControlPointStore {
        &self.points
    }

    /// Finalized polygons and the one being digitized.
    #[must_use]
    pub const fn digitizer(&self) -> &DigitizingSession {
        &self.digitizer
    }

    /// The mapper built from the last successful estimate.
    #[must_use]
    pub const fn mapper(&self) -> Option<&CoordinateMapper> {
        self.mapper.as_ref()
    }

    /// Outcome of the last estimate.
    #[must_use]
    pub const fn status(&self) -> &TransformStatus {
        &self.status
    }

    /// Residuals of the last successful estimate.
    #[must_use]
    pub const fn fit_report(&self) -> Option<&FitReport> {
        self.fit.as_ref()
    }

    /// Place a control point; returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPointError::NonFinitePixel`] for a NaN or infinite
    /// pixel.
    pub fn add_point(&mut self, pixel: Point) -> Result<u32, ControlPointError> {
        self.points.add_point(pixel)
    }

    /// Remove the newest control point, dropping the transform if fewer
    /// than three complete points remain.
    pub fn remove_last_point(&mut self) -> Option<u32> {
        let removed = self.points.remove_last().map(|cp| cp.id());
        self.drop_transform_if_underdetermined();
        removed
    }

    /// Remove every control point and the transform.
    pub fn clear_points(&mut self) {
        self.points.clear();
        self.drop_transform_if_underdetermined();
    }

    /// Fit the transform from the complete control points.
    ///
    /// On success the mapper is replaced and the status becomes `Valid`.
    /// On failure the status becomes `Invalid` and the previous mapper is
    /// kept.
    ///
    /// # Errors
    ///
    /// Propagates [`EstimateError`] from the estimator.
    pub fn compute_transform(&mut self) -> Result<FitReport, EstimateError> {
        let estimator = AffineEstimator::from_config(&self.config);
        match estimator.estimate(self.points.points()) {
            Ok(transform) => {
                let report = FitReport::compute(&transform, self.points.points());
                match &mut self.mapper {
                    Some(mapper) => mapper.replace(transform),
                    None => {
                        self.mapper = Some(CoordinateMapper::with_tolerance(
                            transform,
                            self.config.singular_tolerance,
                        ));
                    }
                }
                self.status = TransformStatus::Valid {
                    transform,
                    rmse: report.rmse,
                };
                self.fit = Some(report.clone());
                Ok(report)
            }
            Err(reason) => {
                log::debug!("transform estimate failed: {reason}");
                self.status = TransformStatus::Invalid {
                    reason: reason.clone(),
                };
                Err(reason)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`SessionError::NoTransform`] before the first successful
    /// estimate.
    pub fn pixel_to_geo(&self, pixel: Point) -> Result<GeoCoord, SessionError> {
        let mapper = self.mapper.as_ref().ok_or(SessionError::NoTransform)?;
        Ok(mapper.pixel_to_geo(pixel))
    }

    /// # Errors
    ///
    /// Returns [`SessionError::NoTransform`] before the first successful
    /// estimate, or a mapping error if the transform is not invertible.
    pub fn geo_to_pixel(&self, geo: GeoCoord) -> Result<Point, SessionError> {
        let mapper = self.mapper.as_ref().ok_or(SessionError::NoTransform)?;
        Ok(mapper.geo_to_pixel(geo)?)
    }

    /// `(id, name, vertex count)` for every finalized polygon.
    #[must_use]
    pub fn polygon_list(&self) -> Vec<PolygonSummary> {
        self.digitizer
            .polygons()
            .iter()
            .map(|p: &Polygon| PolygonSummary {
                id: p.id(),
                name: p.name().to_string(),
                vertices: p.vertex_count(),
            })
            .collect()
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Any error of the underlying operation. A failed command leaves the
    /// session unchanged, except that a failed `compute_transform` records
    /// [`TransformStatus::Invalid`].
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, SessionError> {
        let outcome = match command {
            Command::AddPoint { x, y } => CommandOutcome::PointAdded {
                id: self.add_point(Point::new(x, y))?,
            },
            Command::AssignGeo { id, lon, lat } => {
                self.points.assign_geo(id, lon, lat)?;
                CommandOutcome::GeoAssigned { id }
            }
            Command::ImportGeo { rows } => CommandOutcome::Imported {
                report: self.points.import_geo_csv(&rows, self.config.import_policy)?,
            },
            Command::ImportGeoByPixel { rows } => CommandOutcome::Imported {
                report: self.points.import_geo_by_pixel(&rows)?,
            },
            Command::RemoveLastPoint => CommandOutcome::PointRemoved {
                id: self.remove_last_point(),
            },
            Command::ClearPoints => {
                self.clear_points();
                CommandOutcome::PointsCleared
            }
            Command::ComputeTransform => {
                let report = self.compute_transform()?;
                let transform = self
                    .mapper
                    .as_ref()
                    .map(|m| *m.transform())
                    .ok_or(SessionError::NoTransform)?;
                CommandOutcome::TransformComputed {
                    transform,
                    rmse: report.rmse,
                }
            }
            Command::PixelToGeo { x, y } => CommandOutcome::Geo {
                coord: self.pixel_to_geo(Point::new(x, y))?,
            },
            Command::GeoToPixel { lon, lat } => CommandOutcome::Pixel {
                point: self.geo_to_pixel(GeoCoord::new(lon, lat))?,
            },
            Command::StartPolygon { mode } => {
                self.digitizer.start_polygon(mode)?;
                CommandOutcome::PolygonStarted { mode }
            }
            Command::Click { x, y } => CommandOutcome::Clicked {
                result: self.digitizer.click(Point::new(x, y))?,
            },
            Command::CloseRing => CommandOutcome::RingClosed {
                vertices: self.digitizer.close_ring()?,
            },
            Command::NewRing => {
                self.digitizer.new_ring()?;
                CommandOutcome::RingStarted
            }
            Command::FinalizePolygon { name } => {
                let polygon = self.digitizer.finalize_polygon(&name)?;
                CommandOutcome::PolygonFinalized {
                    id: polygon.id(),
                    name: polygon.name().to_string(),
                }
            }
            Command::DeleteLastPolygon => CommandOutcome::PolygonDeleted {
                id: self.digitizer.delete_last_polygon()?.id(),
            },
            Command::CancelPolygon => CommandOutcome::PolygonCancelled {
                discarded: self.digitizer.cancel_polygon(),
            },
        };
        Ok(outcome)
    }

    fn drop_transform_if_underdetermined(&mut self) {
        if self.mapper.is_none() && self.status == TransformStatus::Absent {
            return;
        }
        let complete = self.points.complete_points().count();
        if complete < MIN_POINTS {
            log::debug!("{complete} complete control points left; dropping transform");
            self.mapper = None;
            self.fit = None;
            self.status = TransformStatus::Absent;
        }
    }
}
