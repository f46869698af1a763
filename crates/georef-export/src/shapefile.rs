//! ESRI shapefile serializer (Polygon layer).
//!
//! Produces the five members of a layer in memory:
//!
//! - `.shp`: geometry, one Polygon (shape type 5) record per polygon;
//! - `.shx`: record offsets into `.shp`;
//! - `.dbf`: `ID` and `NAME` attributes (see [`crate::dbf`]);
//! - `.prj`: the coordinate system tag, verbatim;
//! - `.cpg`: the attribute encoding, always `UTF-8`.
//!
//! ## Byte order
//!
//! File headers and record headers use big-endian integers; everything
//! inside a record uses little-endian. Lengths are counted in 16-bit
//! words.
//!
//! ## Ring orientation
//!
//! Rings are mapped to geographic space first and then normalized: outer
//! rings clockwise, holes counter-clockwise (with latitude pointing up).
//! A ring is a hole when it lies inside an odd number of the polygon's
//! other rings. Each ring is written closed, repeating its first vertex.
//!
//! This is a pure function with no I/O -- it returns byte buffers.

use geo::{BoundingRect, LineString, Rect};
use georef_core::winding::{self, Orientation};
use georef_core::{CoordinateMapper, GeorefConfig, Point, Polygon};

use crate::dbf::{self, DbfDate};
use crate::error::ExportError;

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;
const SHAPE_POLYGON: i32 = 5;
const HEADER_WORDS: i32 = 50;
const RECORD_HEADER_WORDS: i32 = 4;
/// Polygon record content before the part and point arrays: shape type,
/// bounding box, part count, point count.
const POLYGON_FIXED_BYTES: usize = 4 + 32 + 4 + 4;

/// Layer-wide settings for [`to_shapefile`].
#[derive(Debug, Clone, Copy)]
pub struct ShapefileMetadata<'a> {
    /// Written verbatim to the `.prj` file.
    pub coordinate_system: &'a str,
    /// Width in bytes of the `NAME` attribute.
    pub name_field_width: u8,
    /// Date stamped into the `.dbf` header.
    pub date: DbfDate,
}

impl<'a> ShapefileMetadata<'a> {
    /// Take the coordinate system and field width from `config`.
    #[must_use]
    pub fn from_config(config: &'a GeorefConfig, date: DbfDate) -> Self {
        Self {
            coordinate_system: &config.coordinate_system,
            name_field_width: config.name_field_width,
            date,
        }
    }
}

/// The encoded members of one shapefile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapefileLayer {
    /// Geometry records.
    pub shp: Vec<u8>,
    /// Record index.
    pub shx: Vec<u8>,
    /// Attribute table.
    pub dbf: Vec<u8>,
    /// Coordinate system, as WKT.
    pub prj: String,
    /// Attribute encoding name.
    pub cpg: String,
}

impl ShapefileLayer {
    /// Every member as `(extension, contents)`, geometry first.
    #[must_use]
    pub fn files(&self) -> [(&'static str, &[u8]); 5] {
        [
            ("shp", self.shp.as_slice()),
            ("shx", self.shx.as_slice()),
            ("dbf", self.dbf.as_slice()),
            ("prj", self.prj.as_bytes()),
            ("cpg", self.cpg.as_bytes()),
        ]
    }
}

/// Bounding box of `points`, `None` when there are none.
fn bounding_rect<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Rect<f64>> {
    points
        .into_iter()
        .map(|p| geo::Coord { x: p.x, y: p.y })
        .collect::<LineString<f64>>()
        .bounding_rect()
}

/// `[min_x, min_y, max_x, max_y]`, all zero for an empty box.
fn bbox_array(rect: Option<Rect<f64>>) -> [f64; 4] {
    rect.map_or([0.0; 4], |r| [r.min().x, r.min().y, r.max().x, r.max().y])
}

/// One polygon in geographic space with normalized, closed rings.
struct PolygonRecord {
    parts: Vec<usize>,
    points: Vec<Point>,
}

impl PolygonRecord {
    fn build(polygon: &Polygon, mapper: &CoordinateMapper) -> Result<Self, ExportError> {
        let rings: Vec<Vec<Point>> = polygon
            .rings()
            .iter()
            .map(|ring| {
                ring.points()
                    .iter()
                    .map(|&pixel| {
                        let geo = mapper.pixel_to_geo(pixel);
                        Point::new(geo.lon, geo.lat)
                    })
                    .collect()
            })
            .collect();
        if rings.iter().flatten().any(|p| !p.is_finite()) {
            return Err(ExportError::NonFiniteCoordinate {
                polygon: polygon.id(),
            });
        }

        let views: Vec<&[Point]> = rings.iter().map(Vec::as_slice).collect();
        let mut parts = Vec::with_capacity(rings.len());
        let mut points = Vec::with_capacity(rings.iter().map(|r| r.len() + 1).sum());
        for (i, ring) in rings.iter().enumerate() {
            let wanted = if winding::nesting_depth(&views, i) % 2 == 1 {
                Orientation::CounterClockwise
            } else {
                Orientation::Clockwise
            };
            let oriented = winding::with_orientation(ring, wanted);
            parts.push(points.len());
            points.extend_from_slice(&oriented);
            points.extend(oriented.first().copied());
        }
        Ok(Self { parts, points })
    }

    fn content(&self) -> Result<Vec<u8>, ExportError> {
        let len = POLYGON_FIXED_BYTES + 4 * self.parts.len() + 16 * self.points.len();
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&SHAPE_POLYGON.to_le_bytes());
        for v in bbox_array(bounding_rect(&self.points)) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&to_i32(self.parts.len(), "part count")?.to_le_bytes());
        out.extend_from_slice(&to_i32(self.points.len(), "point count")?.to_le_bytes());
        for &start in &self.parts {
            out.extend_from_slice(&to_i32(start, "part index")?.to_le_bytes());
        }
        for p in &self.points {
            out.extend_from_slice(&p.x.to_le_bytes());
            out.extend_from_slice(&p.y.to_le_bytes());
        }
        Ok(out)
    }
}

/// Encode `polygons` as a shapefile layer in geographic coordinates.
///
/// Records are numbered from 1 in slice order; the `ID` attribute holds
/// the polygon's own id. An empty slice yields a valid layer with no
/// records and an all-zero bounding box.
///
/// # Errors
///
/// - [`ExportError::NonFiniteCoordinate`] if a vertex maps to NaN or
///   infinity.
/// - [`ExportError::TooLarge`] if a count or the file length does not fit
///   the format's 32-bit fields.
pub fn to_shapefile(
    polygons: &[Polygon],
    mapper: &CoordinateMapper,
    metadata: &ShapefileMetadata<'_>,
) -> Result<ShapefileLayer, ExportError> {
    let records = polygons
        .iter()
        .map(|p| PolygonRecord::build(p, mapper))
        .collect::<Result<Vec<_>, _>>()?;
    let bbox = bbox_array(bounding_rect(records.iter().flat_map(|r| &r.points)));

    let mut shp_body = Vec::new();
    let mut shx_body = Vec::with_capacity(8 * records.len());
    let mut offset_words = HEADER_WORDS;
    for (i, record) in records.iter().enumerate() {
        let content = record.content()?;
        let content_words = to_i32(content.len() / 2, "record length")?;
        let number = to_i32(i + 1, "record count")?;

        shx_body.extend_from_slice(&offset_words.to_be_bytes());
        shx_body.extend_from_slice(&content_words.to_be_bytes());

        shp_body.extend_from_slice(&number.to_be_bytes());
        shp_body.extend_from_slice(&content_words.to_be_bytes());
        shp_body.extend_from_slice(&content);

        offset_words = offset_words
            .checked_add(RECORD_HEADER_WORDS)
            .and_then(|o| o.checked_add(content_words))
            .ok_or(ExportError::TooLarge { what: "shp file" })?;
    }

    let shx_words = to_i32(shx_body.len() / 2, "shx file")?
        .checked_add(HEADER_WORDS)
        .ok_or(ExportError::TooLarge { what: "shx file" })?;

    let mut shp = file_header(offset_words, bbox);
    shp.extend_from_slice(&shp_body);
    let mut shx = file_header(shx_words, bbox);
    shx.extend_from_slice(&shx_body);

    let rows: Vec<(u32, &str)> = polygons.iter().map(|p| (p.id(), p.name())).collect();
    let dbf = dbf::encode(&rows, metadata.name_field_width, metadata.date)?;

    Ok(ShapefileLayer {
        shp,
        shx,
        dbf,
        prj: metadata.coordinate_system.to_string(),
        cpg: "UTF-8".to_string(),
    })
}

/// The 100-byte header shared by `.shp` and `.shx`.
fn file_header(length_words: i32, bbox: [f64; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(100);
    out.extend_from_slice(&FILE_CODE.to_be_bytes());
    out.extend_from_slice(&[0; 20]);
    out.extend_from_slice(&length_words.to_be_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&SHAPE_POLYGON.to_le_bytes());
    for v in bbox {
        out.extend_from_slice(&v.to_le_bytes());
    }
    // Z and M ranges, unused for 2D polygons.
    out.extend_from_slice(&[0; 32]);
    out
}

fn to_i32(n: usize, what: &'static str) -> Result<i32, ExportError> {
    i32::try_from(n).map_err(|_| ExportError::TooLarge { what })
}
