//! Ring orientation and containment helpers.
//!
//! Thin layer over the `geo` crate for vertex slices, independent of
//! pixel or geographic meaning. All functions treat the slice as an
//! implicitly closed ring (the last vertex connects back to the first) and
//! use the mathematical axis convention: with y pointing up, positive signed area means
//! counter-clockwise.
//!
//! Pixel space has y pointing down, so a ring that *looks* clockwise on
//! screen has positive signed area here. Export code converts rings to
//! geographic space first and only then normalizes orientation.

use geo::algorithm::winding_order::WindingOrder;
use geo::{Area, BoundingRect, Contains, InteriorPoint, LineString, Winding};

use crate::types::Point;

/// Vertex ordering direction of a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Negative signed area (y-up axes).
    Clockwise,
    /// Positive signed area (y-up axes).
    CounterClockwise,
    /// Zero area: fewer than three vertices or all collinear.
    Degenerate,
}

// ---------------------------------------------------------------------------
// Type conversions at the module boundary
// ---------------------------------------------------------------------------

const fn point_to_coord(p: Point) -> geo::Coord<f64> {
    geo::Coord { x: p.x, y: p.y }
}

const fn coord_to_point(c: geo::Coord<f64>) -> Point {
    Point::new(c.x, c.y)
}

/// The ring as a closed `geo` line string.
fn closed_ring(points: &[Point]) -> LineString<f64> {
    let mut ring: LineString<f64> = points.iter().copied().map(point_to_coord).collect();
    ring.close();
    ring
}

fn to_polygon(points: &[Point]) -> geo::Polygon<f64> {
    geo::Polygon::new(closed_ring(points), Vec::new())
}

/// Signed area of the ring, positive when counter-clockwise.
#[must_use]
pub fn signed_area(points: &[Point]) -> f64 {
    to_polygon(points).signed_area()
}

/// Returns `true` if the ring encloses no area relative to its extent.
///
/// The comparison is against the bounding-box area so that the test is
/// independent of the coordinate scale.
#[must_use]
pub fn is_degenerate(points: &[Point]) -> bool {
    if points.len() < 3 {
        return true;
    }
    let polygon = to_polygon(points);
    let Some(rect) = polygon.bounding_rect() else {
        return true;
    };
    polygon.signed_area().abs() <= rect.width() * rect.height() * 1e-12
}

/// Classify the orientation of a ring.
#[must_use]
pub fn orientation(points: &[Point]) -> Orientation {
    if is_degenerate(points) {
        return Orientation::Degenerate;
    }
    match closed_ring(points).winding_order() {
        Some(WindingOrder::Clockwise) => Orientation::Clockwise,
        Some(WindingOrder::CounterClockwise) => Orientation::CounterClockwise,
        None => Orientation::Degenerate,
    }
}

/// Return the ring's vertices ordered in the requested direction.
///
/// Reversal keeps the first vertex in place so that the starting point
/// of a ring is stable across normalization. Degenerate rings, and a
/// requested [`Orientation::Degenerate`], are returned unchanged.
#[must_use]
pub fn with_orientation(points: &[Point], wanted: Orientation) -> Vec<Point> {
    if orientation(points) == Orientation::Degenerate {
        return points.to_vec();
    }
    let mut ring = closed_ring(points);
    match wanted {
        Orientation::Clockwise => ring.make_cw_winding(),
        Orientation::CounterClockwise => ring.make_ccw_winding(),
        Orientation::Degenerate => return points.to_vec(),
    }
    // Reversing a closed ring keeps its first coordinate.
    ring.0.into_iter().take(points.len()).map(coord_to_point).collect()
}

/// Returns `true` if `p` lies strictly inside the ring.
///
/// Points on the boundary are not contained.
#[must_use]
pub fn contains_point(ring: &[Point], p: Point) -> bool {
    to_polygon(ring).contains(&point_to_coord(p))
}

/// Number of other rings in `rings` that contain ring `index`.
///
/// A ring is tested by a point strictly inside it, so a ring that touches
/// another ring's boundary is still classified by where its area lies.
/// Even depth means an outer boundary (or an island inside a hole); odd
/// depth means a hole.
#[must_use]
pub fn nesting_depth(rings: &[&[Point]], index: usize) -> usize {
    let Some(ring) = rings.get(index) else {
        return 0;
    };
    let Some(inside) = to_polygon(ring)
        .interior_point()
        .map(|p| p.0)
        .or_else(|| ring.first().copied().map(point_to_coord))
    else {
        return 0;
    };
    rings
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != index && to_polygon(other).contains(&inside))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn unit_square_ccw() -> Vec<Point> {
        pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn shoelace_unit_square() {
        assert!((signed_area(&unit_square_ccw()) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shoelace_reversed_is_negative() {
        let mut sq = unit_square_ccw();
        sq.reverse();
        assert!((signed_area(&sq) + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shoelace_far_from_origin() {
        let ring = pts(&[
            (500_000.0, 4_000_000.0),
            (500_010.0, 4_000_000.0),
            (500_010.0, 4_000_010.0),
            (500_000.0, 4_000_010.0),
        ]);
        assert!((signed_area(&ring) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_classifies() {
        let ccw = unit_square_ccw();
        let mut cw = ccw.clone();
        cw.reverse();
        assert_eq!(orientation(&ccw), Orientation::CounterClockwise);
        assert_eq!(orientation(&cw), Orientation::Clockwise);
        assert_eq!(
            orientation(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])),
            Orientation::Degenerate,
        );
        assert_eq!(
            orientation(&pts(&[(0.0, 0.0), (1.0, 1.0)])),
            Orientation::Degenerate
        );
    }

    #[test]
    fn with_orientation_keeps_first_vertex() {
        let ccw = unit_square_ccw();
        let cw = with_orientation(&ccw, Orientation::Clockwise);
        assert_eq!(cw[0], ccw[0]);
        assert_eq!(orientation(&cw), Orientation::Clockwise);
        assert_eq!(cw, pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]));
    }

    #[test]
    fn with_orientation_noop_when_already_oriented() {
        let ccw = unit_square_ccw();
        assert_eq!(with_orientation(&ccw, Orientation::CounterClockwise), ccw);
    }

    #[test]
    fn contains_point_inside_and_outside() {
        let sq = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(contains_point(&sq, Point::new(5.0, 5.0)));
        assert!(!contains_point(&sq, Point::new(15.0, 5.0)));
        assert!(!contains_point(&sq, Point::new(5.0, -1.0)));
        assert!(!contains_point(&sq, Point::new(10.0, 5.0)));
    }

    #[test]
    fn contains_point_concave() {
        // U shape opening upwards.
        let u = pts(&[
            (0.0, 0.0),
            (9.0, 0.0),
            (9.0, 9.0),
            (6.0, 9.0),
            (6.0, 3.0),
            (3.0, 3.0),
            (3.0, 9.0),
            (0.0, 9.0),
        ]);
        assert!(contains_point(&u, Point::new(1.0, 5.0)));
        assert!(!contains_point(&u, Point::new(4.5, 6.0)));
    }

    #[test]
    fn nesting_depth_detects_holes() {
        let outer = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let hole = pts(&[(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)]);
        let island = pts(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0)]);
        let separate = pts(&[(20.0, 20.0), (30.0, 20.0), (30.0, 30.0)]);
        let rings: Vec<&[Point]> = vec![&outer, &hole, &island, &separate];
        assert_eq!(nesting_depth(&rings, 0), 0);
        assert_eq!(nesting_depth(&rings, 1), 1);
        assert_eq!(nesting_depth(&rings, 2), 2);
        assert_eq!(nesting_depth(&rings, 3), 0);
        assert_eq!(nesting_depth(&rings, 9), 0);
    }

    #[test]
    fn nesting_depth_ignores_shared_boundary_vertex() {
        let outer = pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        // Starts on the outer ring's right edge, otherwise inside.
        let hole = pts(&[(100.0, 50.0), (70.0, 40.0), (70.0, 60.0)]);
        let rings: Vec<&[Point]> = vec![&outer, &hole];
        assert_eq!(nesting_depth(&rings, 0), 0);
        assert_eq!(nesting_depth(&rings, 1), 1);
    }

    #[test]
    fn nesting_depth_touching_rings_stay_outer() {
        let left = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let right = pts(&[(10.0, 0.0), (20.0, 0.0), (20.0, 10.0), (10.0, 10.0)]);
        let rings: Vec<&[Point]> = vec![&left, &right];
        assert_eq!(nesting_depth(&rings, 0), 0);
        assert_eq!(nesting_depth(&rings, 1), 0);
    }

    #[test]
    fn with_orientation_already_closed_ring() {
        let mut closed = unit_square_ccw();
        closed.push(closed[0]);
        let cw = with_orientation(&closed, Orientation::Clockwise);
        assert_eq!(cw.len(), 5);
        assert_eq!(cw.first(), cw.last());
        assert_eq!(orientation(&cw), Orientation::Clockwise);
    }
}
