//! dBase III attribute table for the shapefile layer.
//!
//! Two fields per record: `ID` as `N(10,0)` and `NAME` as `C(width)`.
//! Text is stored as UTF-8 (declared by the layer's `.cpg` file) and cut
//! on a character boundary when it does not fit.

use crate::error::ExportError;

const VERSION: u8 = 0x03;
const HEADER_TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;
const RECORD_ACTIVE: u8 = b' ';
const DESCRIPTOR_LEN: usize = 32;
const ID_WIDTH: u8 = 10;

/// Last-update date stamped into the table header.
///
/// Supplied by the caller so that encoding stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbfDate {
    /// Full year; stored as an offset from 1900.
    pub year: u16,
    /// 1 to 12.
    pub month: u8,
    /// 1 to 31.
    pub day: u8,
}

impl DbfDate {
    /// Date from its parts. Values are not range-checked.
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

struct Field {
    name: &'static [u8],
    kind: u8,
    width: u8,
}

/// Encode `(id, name)` rows into a complete `.dbf` file.
pub(crate) fn encode(
    rows: &[(u32, &str)],
    name_width: u8,
    date: DbfDate,
) -> Result<Vec<u8>, ExportError> {
    let name_width = name_width.max(1);
    let fields = [
        Field {
            name: b"ID",
            kind: b'N',
            width: ID_WIDTH,
        },
        Field {
            name: b"NAME",
            kind: b'C',
            width: name_width,
        },
    ];

    let record_count = u32::try_from(rows.len()).map_err(|_| ExportError::TooLarge {
        what: "record count",
    })?;
    let header_len = DESCRIPTOR_LEN * (fields.len() + 1) + 1;
    let record_len = 1 + fields.iter().map(|f| usize::from(f.width)).sum::<usize>();
    let header_len_u16 = u16::try_from(header_len).map_err(|_| ExportError::TooLarge {
        what: "dbf header",
    })?;
    let record_len_u16 = u16::try_from(record_len).map_err(|_| ExportError::TooLarge {
        what: "dbf record",
    })?;

    let mut out = Vec::with_capacity(header_len + record_len * rows.len() + 1);
    out.push(VERSION);
    out.push(u8::try_from(date.year.saturating_sub(1900)).unwrap_or(u8::MAX));
    out.push(date.month);
    out.push(date.day);
    out.extend_from_slice(&record_count.to_le_bytes());
    out.extend_from_slice(&header_len_u16.to_le_bytes());
    out.extend_from_slice(&record_len_u16.to_le_bytes());
    out.extend_from_slice(&[0; 20]);

    for field in &fields {
        let mut name = [0u8; 11];
        name[..field.name.len()].copy_from_slice(field.name);
        out.extend_from_slice(&name);
        out.push(field.kind);
        out.extend_from_slice(&[0; 4]);
        out.push(field.width);
        out.push(0); // decimal count
        out.extend_from_slice(&[0; 14]);
    }
    out.push(HEADER_TERMINATOR);

    for &(id, name) in rows {
        out.push(RECORD_ACTIVE);
        out.extend_from_slice(format!("{id:>10}").as_bytes());
        let name = truncate_utf8(name, usize::from(name_width));
        out.extend_from_slice(name.as_bytes());
        out.resize(out.len() + usize::from(name_width) - name.len(), b' ');
    }
    out.push(END_OF_FILE);
    Ok(out)
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a
/// character.
fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
