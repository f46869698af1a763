//! Polygon digitizing: a state machine that turns clicks into rings and
//! rings into named polygons, all in pixel space.
//!
//! Two pieces of state interact:
//!
//! - the **active polygon**, created by [`DigitizingSession::start_polygon`]
//!   with a fixed [`DrawMode`] and sealed by
//!   [`DigitizingSession::finalize_polygon`];
//! - the **ring state** of that polygon ([`RingState`]), which moves
//!   `Idle → Building → Closed` as vertices are clicked and the ring is
//!   closed, and back to `Idle` on [`DigitizingSession::new_ring`].
//!
//! In [`DrawMode::Lines`] each click appends a vertex and rings are closed
//! explicitly; a polygon may hold several rings. In
//! [`DrawMode::Rectangle`] the first click places a corner and the second
//! synthesizes and closes a four-vertex ring, which is the polygon's only
//! ring.
//!
//! Every operation either succeeds completely or returns an error and
//! leaves the session unchanged.

use serde::{Deserialize, Serialize};

use crate::error::DigitizeError;
use crate::types::{Point, Polygon, Ring};

/// How clicks are interpreted while a polygon is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Each click appends a vertex; rings are closed explicitly.
    #[default]
    Lines,
    /// Two clicks define opposite corners of an axis-aligned rectangle.
    Rectangle,
}

/// Progress of the ring currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingState {
    /// No vertices yet.
    Idle,
    /// At least one vertex (or the first rectangle corner) placed.
    Building,
    /// The ring was closed and moved to the pending list.
    Closed,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickOutcome {
    /// A vertex was appended to the open ring.
    VertexAdded {
        /// Vertices in the open ring after the click.
        count: usize,
    },
    /// The first rectangle corner was recorded.
    CornerPlaced,
    /// The click completed and closed a ring.
    RingClosed {
        /// Vertices in the closed ring.
        vertices: usize,
    },
}

/// Read-only view of the in-progress polygon for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview<'a> {
    /// Mode chosen when the polygon was started.
    pub mode: DrawMode,
    /// Ring progress.
    pub state: RingState,
    /// Vertices of the open ring (the anchor corner in rectangle mode).
    pub vertices: &'a [Point],
    /// Rings already closed for this polygon.
    pub pending_rings: &'a [Ring],
    /// First corner of a rectangle awaiting its second click.
    pub rectangle_anchor: Option<Point>,
}

#[derive(Debug, Clone, PartialEq)]
struct ActivePolygon {
    mode: DrawMode,
    vertices: Vec<Point>,
    closed: bool,
    pending: Vec<Ring>,
}

impl ActivePolygon {
    const fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            vertices: Vec::new(),
            closed: false,
            pending: Vec::new(),
        }
    }

    const fn state(&self) -> RingState {
        if self.closed {
            RingState::Closed
        } else if self.vertices.is_empty() {
            RingState::Idle
        } else {
            RingState::Building
        }
    }

    const fn is_blank(&self) -> bool {
        self.vertices.is_empty() && self.pending.is_empty()
    }
}

/// All digitized geometry of one session: finalized polygons plus the
/// polygon currently being drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitizingSession {
    active: Option<ActivePolygon>,
    polygons: Vec<Polygon>,
    last_id: u32,
}

impl DigitizingSession {
    /// Create an empty session. The first finalized polygon gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new polygon drawn in `mode`.
    ///
    /// Restarting is allowed while the active polygon has no geometry
    /// yet, which simply changes the mode.
    ///
    /// # Errors
    ///
    /// Returns [`DigitizeError::PolygonInProgress`] if the active polygon
    /// already has vertices or closed rings.
    pub fn start_polygon(&mut self, mode: DrawMode) -> Result<(), DigitizeError> {
        if self.active.as_ref().is_some_and(|a| !a.is_blank()) {
            return Err(DigitizeError::PolygonInProgress);
        }
        self.active = Some(ActivePolygon::new(mode));
        Ok(())
    }

    /// Feed one click at `pixel` into the active polygon.
    ///
    /// # Errors
    ///
    /// - [`DigitizeError::NoActivePolygon`] before `start_polygon`.
    /// - [`DigitizeError::NonFiniteVertex`] for NaN or infinite input.
    /// - [`DigitizeError::DuplicateVertex`] if `pixel` equals the previous
    ///   vertex (or the first rectangle corner).
    /// - [`DigitizeError::RingClosed`] in lines mode after `close_ring`
    ///   without `new_ring`.
    /// - [`DigitizeError::MultiRingUnsupported`] in rectangle mode once the
    ///   rectangle exists.
    /// - [`DigitizeError::DegenerateRing`] if the rectangle corners share
    ///   an x or y coordinate.
    pub fn click(&mut self, pixel: Point) -> Result<ClickOutcome, DigitizeError> {
        if !pixel.is_finite() {
            return Err(DigitizeError::NonFiniteVertex);
        }
        let active = self.active.as_mut().ok_or(DigitizeError::NoActivePolygon)?;
        match active.mode {
            DrawMode::Lines => {
                if active.closed {
                    return Err(DigitizeError::RingClosed);
                }
                if active.vertices.last() == Some(&pixel) {
                    return Err(DigitizeError::DuplicateVertex {
                        x: pixel.x,
                        y: pixel.y,
                    });
                }
                active.vertices.push(pixel);
                Ok(ClickOutcome::VertexAdded {
                    count: active.vertices.len(),
                })
            }
            DrawMode::Rectangle => {
                if active.closed {
                    return Err(DigitizeError::MultiRingUnsupported);
                }
                let Some(&anchor) = active.vertices.first() else {
                    active.vertices.push(pixel);
                    return Ok(ClickOutcome::CornerPlaced);
                };
                if anchor == pixel {
                    return Err(DigitizeError::DuplicateVertex {
                        x: pixel.x,
                        y: pixel.y,
                    });
                }
                // Float equality is intended: a zero-width rectangle is one
                // whose corners share a coordinate exactly.
                #[allow(clippy::float_cmp)]
                if anchor.x == pixel.x || anchor.y == pixel.y {
                    return Err(DigitizeError::DegenerateRing { vertices: 2 });
                }
                let ring = Ring::new(rectangle_corners(anchor, pixel).to_vec())?;
                let vertices = ring.len();
                active.vertices.clear();
                active.pending.push(ring);
                active.closed = true;
                log::debug!("rectangle ring closed");
                Ok(ClickOutcome::RingClosed { vertices })
            }
        }
    }

    /// Close the open ring and add it to the polygon's pending rings.
    ///
    /// If the last vertex repeats the first it is treated as the explicit
    /// closing vertex and dropped; closure is otherwise implied.
    ///
    /// Returns the number of vertices in the closed ring.
    ///
    /// # Errors
    ///
    /// - [`DigitizeError::NoActivePolygon`] before `start_polygon`.
    /// - [`DigitizeError::RingClosed`] if the ring is already closed.
    /// - [`DigitizeError::DegenerateRing`] with fewer than three distinct
    ///   vertices, collinear vertices, or an unfinished rectangle.
    pub fn close_ring(&mut self) -> Result<usize, DigitizeError> {
        let active = self.active.as_mut().ok_or(DigitizeError::NoActivePolygon)?;
        if active.closed {
            return Err(DigitizeError::RingClosed);
        }
        if active.mode == DrawMode::Rectangle {
            return Err(DigitizeError::DegenerateRing {
                vertices: active.vertices.len(),
            });
        }
        let ring = Ring::new(active.vertices.clone())?;
        let vertices = ring.len();
        active.vertices.clear();
        active.pending.push(ring);
        active.closed = true;
        log::debug!(
            "ring {} closed with {vertices} vertices",
            active.pending.len()
        );
        Ok(vertices)
    }

    /// Start another ring in the same polygon.
    ///
    /// A no-op when no ring has been started yet.
    ///
    /// # Errors
    ///
    /// - [`DigitizeError::NoActivePolygon`] before `start_polygon`.
    /// - [`DigitizeError::MultiRingUnsupported`] in rectangle mode.
    /// - [`DigitizeError::RingInProgress`] while the current ring is open.
    pub fn new_ring(&mut self) -> Result<(), DigitizeError> {
        let active = self.active.as_mut().ok_or(DigitizeError::NoActivePolygon)?;
        if active.mode == DrawMode::Rectangle {
            return Err(DigitizeError::MultiRingUnsupported);
        }
        match active.state() {
            RingState::Building => Err(DigitizeError::RingInProgress),
            RingState::Idle => Ok(()),
            RingState::Closed => {
                active.closed = false;
                Ok(())
            }
        }
    }

    /// Seal the pending rings into a polygon named `name`.
    ///
    /// A blank name is replaced by `Poly_<id>`. Ids are sequential from 1
    /// and never reused, even after deletion.
    ///
    /// # Errors
    ///
    /// - [`DigitizeError::EmptyPolygon`] if no ring has been closed.
    /// - [`DigitizeError::RingInProgress`] if an unclosed ring has vertices.
    pub fn finalize_polygon(&mut self, name: &str) -> Result<&Polygon, DigitizeError> {
        let active = self.active.as_ref().ok_or(DigitizeError::EmptyPolygon)?;
        if active.pending.is_empty() {
            return Err(DigitizeError::EmptyPolygon);
        }
        if active.state() == RingState::Building {
            return Err(DigitizeError::RingInProgress);
        }

        let id = self.last_id + 1;
        let name = name.trim();
        let name = if name.is_empty() {
            format!("Poly_{id}")
        } else {
            name.to_string()
        };
        let pending = self
            .active
            .take()
            .map(|a| a.pending)
            .unwrap_or_default();
        let polygon = Polygon::new(id, name, pending)?;
        log::debug!(
            "polygon {id} '{}' finalized with {} ring(s)",
            polygon.name(),
            polygon.rings().len()
        );
        self.last_id = id;
        self.polygons.push(polygon);
        Ok(&self.polygons[self.polygons.len() - 1])
    }

    /// Remove the most recently finalized polygon.
    ///
    /// The active polygon, if any, is not affected.
    ///
    /// # Errors
    ///
    /// Returns [`DigitizeError::NothingToDelete`] if there are no
    /// finalized polygons.
    pub fn delete_last_polygon(&mut self) -> Result<Polygon, DigitizeError> {
        self.polygons.pop().ok_or(DigitizeError::NothingToDelete)
    }

    /// Discard the active polygon and all of its geometry.
    ///
    /// Returns `true` if there was an active polygon.
    pub fn cancel_polygon(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Mode of the active polygon.
    #[must_use]
    pub fn mode(&self) -> Option<DrawMode> {
        self.active.as_ref().map(|a| a.mode)
    }

    /// Ring state of the active polygon (`Idle` when none is active).
    #[must_use]
    pub fn ring_state(&self) -> RingState {
        self.active.as_ref().map_or(RingState::Idle, ActivePolygon::state)
    }

    /// In-progress geometry, or `None` when no polygon is active.
    #[must_use]
    pub fn preview(&self) -> Option<Preview<'_>> {
        self.active.as_ref().map(|a| Preview {
            mode: a.mode,
            state: a.state(),
            vertices: &a.vertices,
            pending_rings: &a.pending,
            rectangle_anchor: match a.mode {
                DrawMode::Rectangle if !a.closed => a.vertices.first().copied(),
                _ => None,
            },
        })
    }

    /// The rectangle that a click at `cursor` would produce, while the
    /// first corner of a rectangle is placed.
    #[must_use]
    pub fn rectangle_preview(&self, cursor: Point) -> Option<[Point; 4]> {
        let active = self.active.as_ref()?;
        if active.mode != DrawMode::Rectangle || active.closed {
            return None;
        }
        active
            .vertices
            .first()
            .map(|&anchor| rectangle_corners(anchor, cursor))
    }

    /// Finalized polygons in creation order.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Owned copy of the finalized polygons, safe to hand to an exporter
    /// while the session keeps changing.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Polygon> {
        self.polygons.clone()
    }
}

/// Corners of the axis-aligned rectangle spanned by `a` and `b`.
///
/// The order is fixed regardless of which corners were clicked:
/// `(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)`,
/// i.e. clockwise on screen where y grows downwards.
#[must_use]
pub fn rectangle_corners(a: Point, b: Point) -> [Point; 4] {
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    [
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines_session() -> DigitizingSession {
        let mut s = DigitizingSession::new();
        s.start_polygon(DrawMode::Lines).unwrap();
        s
    }

    fn click_all(s: &mut DigitizingSession, pts: &[(f64, f64)]) {
        for &(x, y) in pts {
            s.click(Point::new(x, y)).unwrap();
        }
    }

    const TRIANGLE: [(f64, f64); 3] = [(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)];

    // --- Lines mode ---

    #[test]
    fn triangle_closes() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE);
        assert_eq!(s.ring_state(), RingState::Building);
        assert_eq!(s.close_ring().unwrap(), 3);
        assert_eq!(s.ring_state(), RingState::Closed);
    }

    #[test]
    fn two_vertices_cannot_close() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE[..2]);
        assert_eq!(
            s.close_ring(),
            Err(DigitizeError::DegenerateRing { vertices: 2 })
        );
        // State unchanged: still building with both vertices.
        assert_eq!(s.preview().unwrap().vertices.len(), 2);
        assert_eq!(s.ring_state(), RingState::Building);
    }

    #[test]
    fn collinear_ring_cannot_close() {
        let mut s = lines_session();
        click_all(&mut s, &[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]);
        assert!(matches!(
            s.close_ring(),
            Err(DigitizeError::DegenerateRing { .. })
        ));
    }

    #[test]
    fn explicit_closing_click_is_absorbed() {
        let mut s = lines_session();
        click_all(&mut s, &[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0), (0.0, 0.0)]);
        assert_eq!(s.close_ring().unwrap(), 3);
    }

    #[test]
    fn duplicate_vertex_rejected() {
        let mut s = lines_session();
        s.click(Point::new(3.0, 4.0)).unwrap();
        assert_eq!(
            s.click(Point::new(3.0, 4.0)),
            Err(DigitizeError::DuplicateVertex { x: 3.0, y: 4.0 })
        );
        assert_eq!(s.preview().unwrap().vertices.len(), 1);
    }

    #[test]
    fn non_finite_click_rejected() {
        let mut s = lines_session();
        assert_eq!(
            s.click(Point::new(f64::NAN, 0.0)),
            Err(DigitizeError::NonFiniteVertex)
        );
    }

    #[test]
    fn click_requires_active_polygon() {
        let mut s = DigitizingSession::new();
        assert_eq!(
            s.click(Point::new(1.0, 1.0)),
            Err(DigitizeError::NoActivePolygon)
        );
        assert_eq!(s.close_ring(), Err(DigitizeError::NoActivePolygon));
        assert_eq!(s.new_ring(), Err(DigitizeError::NoActivePolygon));
    }

    #[test]
    fn click_after_close_requires_new_ring() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE);
        s.close_ring().unwrap();
        assert_eq!(
            s.click(Point::new(20.0, 20.0)),
            Err(DigitizeError::RingClosed)
        );
        assert_eq!(s.close_ring(), Err(DigitizeError::RingClosed));
        s.new_ring().unwrap();
        assert_eq!(s.ring_state(), RingState::Idle);
        assert_eq!(
            s.click(Point::new(20.0, 20.0)),
            Ok(ClickOutcome::VertexAdded { count: 1 })
        );
    }

    #[test]
    fn new_ring_while_building_fails() {
        let mut s = lines_session();
        s.click(Point::new(1.0, 1.0)).unwrap();
        assert_eq!(s.new_ring(), Err(DigitizeError::RingInProgress));
    }

    #[test]
    fn multi_ring_polygon() {
        let mut s = lines_session();
        click_all(&mut s, &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        s.close_ring().unwrap();
        s.new_ring().unwrap();
        click_all(
            &mut s,
            &[(20.0, 20.0), (40.0, 20.0), (40.0, 40.0), (30.0, 50.0), (20.0, 40.0)],
        );
        s.close_ring().unwrap();
        let poly = s.finalize_polygon("field").unwrap();
        assert_eq!(poly.rings().len(), 2);
        assert_eq!(poly.rings()[0].len(), 4);
        assert_eq!(poly.rings()[1].len(), 5);
    }

    // --- Rectangle mode ---

    #[test]
    fn rectangle_from_two_corners() {
        let mut s = DigitizingSession::new();
        s.start_polygon(DrawMode::Rectangle).unwrap();
        assert_eq!(
            s.click(Point::new(10.0, 10.0)),
            Ok(ClickOutcome::CornerPlaced)
        );
        assert_eq!(s.ring_state(), RingState::Building);
        assert_eq!(
            s.click(Point::new(50.0, 40.0)),
            Ok(ClickOutcome::RingClosed { vertices: 4 })
        );
        assert_eq!(s.ring_state(), RingState::Closed);
        let poly = s.finalize_polygon("rect").unwrap();
        assert_eq!(
            poly.rings()[0].points(),
            &[
                Point::new(10.0, 10.0),
                Point::new(50.0, 10.0),
                Point::new(50.0, 40.0),
                Point::new(10.0, 40.0),
            ]
        );
    }

    #[test]
    fn rectangle_winding_independent_of_click_order() {
        let expected = rectangle_corners(Point::new(10.0, 10.0), Point::new(50.0, 40.0));
        for (a, b) in [
            ((50.0, 40.0), (10.0, 10.0)),
            ((50.0, 10.0), (10.0, 40.0)),
            ((10.0, 40.0), (50.0, 10.0)),
        ] {
            assert_eq!(
                rectangle_corners(Point::new(a.0, a.1), Point::new(b.0, b.1)),
                expected
            );
        }
    }

    #[test]
    fn rectangle_rejects_single_ring_extras() {
        let mut s = DigitizingSession::new();
        s.start_polygon(DrawMode::Rectangle).unwrap();
        click_all(&mut s, &[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(
            s.click(Point::new(9.0, 9.0)),
            Err(DigitizeError::MultiRingUnsupported)
        );
        assert_eq!(s.new_ring(), Err(DigitizeError::MultiRingUnsupported));
    }

    #[test]
    fn rectangle_zero_width_rejected() {
        let mut s = DigitizingSession::new();
        s.start_polygon(DrawMode::Rectangle).unwrap();
        s.click(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(
            s.click(Point::new(5.0, 30.0)),
            Err(DigitizeError::DegenerateRing { vertices: 2 })
        );
        assert_eq!(
            s.click(Point::new(5.0, 5.0)),
            Err(DigitizeError::DuplicateVertex { x: 5.0, y: 5.0 })
        );
        // Anchor survives the failed clicks.
        assert!(s.click(Point::new(9.0, 30.0)).is_ok());
    }

    #[test]
    fn rectangle_close_ring_before_second_corner() {
        let mut s = DigitizingSession::new();
        s.start_polygon(DrawMode::Rectangle).unwrap();
        s.click(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(
            s.close_ring(),
            Err(DigitizeError::DegenerateRing { vertices: 1 })
        );
    }

    #[test]
    fn rectangle_preview_follows_cursor() {
        let mut s = DigitizingSession::new();
        s.start_polygon(DrawMode::Rectangle).unwrap();
        assert!(s.rectangle_preview(Point::new(1.0, 1.0)).is_none());
        s.click(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(
            s.preview().unwrap().rectangle_anchor,
            Some(Point::new(10.0, 10.0))
        );
        let preview = s.rectangle_preview(Point::new(0.0, 20.0)).unwrap();
        assert_eq!(preview[0], Point::new(0.0, 10.0));
        assert_eq!(preview[2], Point::new(10.0, 20.0));
    }

    // --- Polygon lifecycle ---

    #[test]
    fn finalize_without_rings_fails() {
        let mut s = DigitizingSession::new();
        assert_eq!(
            s.finalize_polygon("x").unwrap_err(),
            DigitizeError::EmptyPolygon
        );
        s.start_polygon(DrawMode::Lines).unwrap();
        assert_eq!(
            s.finalize_polygon("x").unwrap_err(),
            DigitizeError::EmptyPolygon
        );
    }

    #[test]
    fn finalize_with_open_ring_fails() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE);
        s.close_ring().unwrap();
        s.new_ring().unwrap();
        s.click(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(
            s.finalize_polygon("x").unwrap_err(),
            DigitizeError::RingInProgress
        );
        assert!(s.polygons().is_empty());
    }

    #[test]
    fn ids_increase_from_one_and_are_not_reused() {
        let mut s = DigitizingSession::new();
        for expected in 1..=3 {
            s.start_polygon(DrawMode::Lines).unwrap();
            click_all(&mut s, &TRIANGLE);
            s.close_ring().unwrap();
            assert_eq!(s.finalize_polygon("p").unwrap().id(), expected);
        }
        assert_eq!(s.delete_last_polygon().unwrap().id(), 3);
        s.start_polygon(DrawMode::Lines).unwrap();
        click_all(&mut s, &TRIANGLE);
        s.close_ring().unwrap();
        assert_eq!(s.finalize_polygon("p").unwrap().id(), 4);
    }

    #[test]
    fn blank_name_gets_default() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE);
        s.close_ring().unwrap();
        assert_eq!(s.finalize_polygon("  ").unwrap().name(), "Poly_1");
    }

    #[test]
    fn finalize_returns_to_no_active_polygon() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE);
        s.close_ring().unwrap();
        s.finalize_polygon("a").unwrap();
        assert!(s.mode().is_none());
        assert!(s.preview().is_none());
        assert_eq!(
            s.click(Point::new(1.0, 1.0)),
            Err(DigitizeError::NoActivePolygon)
        );
    }

    #[test]
    fn delete_last_polygon_empty() {
        let mut s = DigitizingSession::new();
        assert_eq!(
            s.delete_last_polygon(),
            Err(DigitizeError::NothingToDelete)
        );
    }

    #[test]
    fn delete_does_not_touch_active_ring() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE);
        s.close_ring().unwrap();
        s.finalize_polygon("a").unwrap();
        s.start_polygon(DrawMode::Lines).unwrap();
        click_all(&mut s, &TRIANGLE[..2]);
        s.delete_last_polygon().unwrap();
        assert_eq!(s.preview().unwrap().vertices.len(), 2);
    }

    #[test]
    fn start_polygon_guards_geometry() {
        let mut s = lines_session();
        // Switching mode on a blank polygon is fine.
        s.start_polygon(DrawMode::Rectangle).unwrap();
        assert_eq!(s.mode(), Some(DrawMode::Rectangle));
        s.click(Point::new(1.0, 1.0)).unwrap();
        assert_eq!(
            s.start_polygon(DrawMode::Lines),
            Err(DigitizeError::PolygonInProgress)
        );
        assert!(s.cancel_polygon());
        s.start_polygon(DrawMode::Lines).unwrap();
    }

    #[test]
    fn snapshot_is_independent() {
        let mut s = lines_session();
        click_all(&mut s, &TRIANGLE);
        s.close_ring().unwrap();
        s.finalize_polygon("a").unwrap();
        let snap = s.snapshot();
        s.delete_last_polygon().unwrap();
        assert_eq!(snap.len(), 1);
        assert!(s.polygons().is_empty());
    }
}
