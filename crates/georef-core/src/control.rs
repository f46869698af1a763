//! Control point store: pixel positions and their geographic coordinates.
//!
//! Points are kept in creation order and identified by a monotonically
//! increasing id that is never reused, even after removal. Raw CSV text
//! is not handled here; imports accept rows already split into fields.

use serde::{Deserialize, Serialize};

use crate::config::ImportPolicy;
use crate::error::ControlPointError;
use crate::types::{ControlPoint, GeoCoord, Point};

/// Reported when an ordered import had a different number of rows than
/// there are control points. The import itself still succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMismatchWarning {
    /// Number of rows supplied.
    pub rows: usize,
    /// Number of control points in the store.
    pub points: usize,
}

/// Summary of a geographic coordinate import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Number of points whose coordinate was (re)assigned.
    pub assigned: usize,
    /// Present when rows and points did not line up one-to-one.
    pub mismatch: Option<CountMismatchWarning>,
}

/// Ordered collection of control points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPointStore {
    points: Vec<ControlPoint>,
    next_id: u32,
}

impl ControlPointStore {
    /// Create an empty store. The first point gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point at `pixel` with no geographic coordinate.
    ///
    /// Duplicate pixels are accepted; they only matter (as a degenerate
    /// configuration) at estimation time.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPointError::NonFinitePixel`] if either coordinate
    /// is NaN or infinite. No id is consumed.
    pub fn add_point(&mut self, pixel: Point) -> Result<u32, ControlPointError> {
        if !pixel.is_finite() {
            return Err(ControlPointError::NonFinitePixel);
        }
        self.next_id += 1;
        let id = self.next_id;
        self.points.push(ControlPoint::new(id, pixel));
        log::debug!("control point {id} added at ({}, {})", pixel.x, pixel.y);
        Ok(id)
    }

    /// Assign a geographic coordinate to an existing point.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPointError::UnknownPoint`] if no point has `id`
    /// and [`ControlPointError::NonFiniteGeo`] if `lon` or `lat` is NaN or
    /// infinite.
    pub fn assign_geo(&mut self, id: u32, lon: f64, lat: f64) -> Result<(), ControlPointError> {
        let geo = GeoCoord::new(lon, lat);
        if !geo.is_finite() {
            return Err(ControlPointError::NonFiniteGeo { id });
        }
        let point = self
            .points
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(ControlPointError::UnknownPoint(id))?;
        point.set_geo(geo);
        Ok(())
    }

    /// Assign coordinates from `lon,lat` rows to points in creation order.
    ///
    /// Every row is parsed before any point is modified. Under
    /// [`ImportPolicy::Truncate`], extra rows are ignored and surplus
    /// points keep their current coordinate; the mismatch is reported in
    /// the returned [`ImportReport`].
    ///
    /// # Errors
    ///
    /// Returns [`ControlPointError::MalformedRow`] if a row is not exactly
    /// two finite numbers, and [`ControlPointError::CountMismatch`] under
    /// [`ImportPolicy::Strict`] when the counts differ.
    pub fn import_geo_csv<R, S>(
        &mut self,
        rows: &[R],
        policy: ImportPolicy,
    ) -> Result<ImportReport, ControlPointError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let coords = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let [lon, lat] = parse_fields::<2, S>(i, row.as_ref())?;
                Ok(GeoCoord::new(lon, lat))
            })
            .collect::<Result<Vec<_>, ControlPointError>>()?;

        let mismatch = (coords.len() != self.points.len()).then_some(CountMismatchWarning {
            rows: coords.len(),
            points: self.points.len(),
        });
        if let (Some(m), ImportPolicy::Strict) = (mismatch, policy) {
            return Err(ControlPointError::CountMismatch {
                rows: m.rows,
                points: m.points,
            });
        }
        if let Some(m) = mismatch {
            log::warn!(
                "imported {} coordinate rows for {} control points; extra entries ignored",
                m.rows,
                m.points,
            );
        }

        let mut assigned = 0;
        for (point, geo) in self.points.iter_mut().zip(coords) {
            point.set_geo(geo);
            assigned += 1;
        }
        Ok(ImportReport { assigned, mismatch })
    }

    /// Assign coordinates from `col,row,lon,lat` rows to the point nearest
    /// to each row's pixel position.
    ///
    /// When several rows resolve to the same point, the last one wins.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPointError::MalformedRow`] if a row is not exactly
    /// four finite numbers, and [`ControlPointError::NoPoints`] if the
    /// store is empty.
    pub fn import_geo_by_pixel<R, S>(&mut self, rows: &[R]) -> Result<ImportReport, ControlPointError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let parsed = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let [col, line, lon, lat] = parse_fields::<4, S>(i, row.as_ref())?;
                Ok((Point::new(col, line), GeoCoord::new(lon, lat)))
            })
            .collect::<Result<Vec<_>, ControlPointError>>()?;
        if self.points.is_empty() {
            return Err(ControlPointError::NoPoints);
        }

        let mut touched = vec![false; self.points.len()];
        for (pixel, geo) in parsed {
            let nearest = self
                .points
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.pixel()
                        .distance_squared(pixel)
                        .total_cmp(&b.pixel().distance_squared(pixel))
                })
                .map(|(i, _)| i);
            if let Some(i) = nearest {
                self.points[i].set_geo(geo);
                touched[i] = true;
            }
        }

        let assigned = touched.iter().filter(|&&t| t).count();
        let mismatch = (rows.len() != self.points.len()).then_some(CountMismatchWarning {
            rows: rows.len(),
            points: self.points.len(),
        });
        Ok(ImportReport { assigned, mismatch })
    }

    /// Remove the most recently added point, whether or not it has a
    /// geographic coordinate.
    pub fn remove_last(&mut self) -> Option<ControlPoint> {
        self.points.pop()
    }

    /// Remove every point. Ids continue from where they left off.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Look up a point by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&ControlPoint> {
        self.points.iter().find(|p| p.id() == id)
    }

    /// All points in creation order.
    #[must_use]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Points that carry a geographic coordinate, in creation order.
    pub fn complete_points(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points.iter().filter(|p| p.is_complete())
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the store holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Parse exactly `N` finite floats from one row.
fn parse_fields<const N: usize, S: AsRef<str>>(
    row_index: usize,
    fields: &[S],
) -> Result<[f64; N], ControlPointError> {
    if fields.len() != N {
        return Err(ControlPointError::MalformedRow {
            row: row_index,
            reason: format!("expected {N} fields, found {}", fields.len()),
        });
    }
    let mut out = [0.0; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        let text = field.as_ref().trim();
        let value: f64 = text.parse().map_err(|_| ControlPointError::MalformedRow {
            row: row_index,
            reason: format!("{text:?} is not a number"),
        })?;
        if !value.is_finite() {
            return Err(ControlPointError::MalformedRow {
                row: row_index,
                reason: format!("{text:?} is not finite"),
            });
        }
        *slot = value;
    }
    Ok(out)
}
