//! Flat vertex table (`<name>_vertices.csv`) serializer.
//!
//! One row per stored vertex: `poly_id,name,vertex_index,x,y`, where
//! `x,y` are longitude and latitude. `vertex_index` restarts at 0 for
//! every ring, which is the only place ring boundaries show up in this
//! format. The closing vertex is not repeated.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::borrow::Cow;
use std::fmt::Write;

use georef_core::{CoordinateMapper, Polygon};

use crate::error::ExportError;

/// Column header line, without the line terminator.
pub const HEADER: &str = "poly_id,name,vertex_index,x,y";

/// Serialize every vertex of `polygons` to CSV in geographic coordinates.
///
/// Rows end in `\n`. Names are quoted per RFC 4180 when they contain a
/// comma, quote or line break. Coordinates use the shortest decimal text
/// that reads back to the same `f64`.
///
/// # Errors
///
/// Returns [`ExportError::NonFiniteCoordinate`] if a vertex maps to NaN
/// or infinity.
pub fn to_vertex_csv(
    polygons: &[Polygon],
    mapper: &CoordinateMapper,
) -> Result<String, ExportError> {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER}");
    for polygon in polygons {
        let name = escape_field(polygon.name());
        for ring in polygon.rings() {
            for (index, &pixel) in ring.points().iter().enumerate() {
                let geo = mapper.pixel_to_geo(pixel);
                if !geo.is_finite() {
                    return Err(ExportError::NonFiniteCoordinate {
                        polygon: polygon.id(),
                    });
                }
                let _ = writeln!(
                    out,
                    "{},{name},{index},{},{}",
                    polygon.id(),
                    geo.lon,
                    geo.lat
                );
            }
        }
    }
    Ok(out)
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use georef_core::{AffineTransform, Point, Ring};

    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(AffineTransform::new(0.01, 0.0, -110.0, 0.0, -0.01, 24.0))
    }

    fn ring(coords: &[(f64, f64)]) -> Ring {
        Ring::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
    }

    fn two_ring_polygon() -> Polygon {
        Polygon::new(
            1,
            "field",
            vec![
                ring(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]),
                ring(&[(20.0, 20.0), (40.0, 20.0), (40.0, 40.0), (30.0, 50.0), (20.0, 40.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn header_only_when_empty() {
        assert_eq!(to_vertex_csv(&[], &mapper()).unwrap(), format!("{HEADER}\n"));
    }

    #[test]
    fn index_resets_per_ring() {
        let csv = to_vertex_csv(&[two_ring_polygon()], &mapper()).unwrap();
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows.len(), 9);
        let indices: Vec<&str> = rows
            .iter()
            .map(|r| r.split(',').nth(2).unwrap())
            .collect();
        assert_eq!(indices, ["0", "1", "2", "3", "0", "1", "2", "3", "4"]);
    }

    #[test]
    fn rows_carry_geo_coordinates() {
        let csv = to_vertex_csv(&[two_ring_polygon()], &mapper()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("1,field,0,-110,24"));
        assert_eq!(lines.next(), Some("1,field,1,-109,24"));
    }

    #[test]
    fn names_are_quoted_when_needed() {
        assert_eq!(escape_field("plain name"), "plain name");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn non_finite_mapping_is_an_error() {
        let m = CoordinateMapper::new(AffineTransform::new(f64::INFINITY, 0.0, 0.0, 0.0, 1.0, 0.0));
        assert_eq!(
            to_vertex_csv(&[two_ring_polygon()], &m),
            Err(ExportError::NonFiniteCoordinate { polygon: 1 })
        );
    }
}
