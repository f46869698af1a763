//! Control point coordinate CSV files.
//!
//! Two layouts are recognised by their header:
//!
//! - `x,y`: one row per control point, matched in creation order;
//! - `col,row,x,y`: each row is matched to the control point nearest to
//!   `(col, row)` in pixel space.
//!
//! Columns may appear in any order and unknown columns are ignored. The
//! file may start with a UTF-8 byte order mark. Numbers are not parsed
//! here; rows are handed to the core as string fields so that all
//! validation happens in one place.

use std::path::Path;

use georef_core::Command;

use crate::error::IoError;

/// How rows are matched to control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCsvKind {
    /// `x,y` rows in control point creation order.
    Ordered,
    /// `col,row,x,y` rows matched by nearest pixel.
    ByPixel,
}

/// A parsed control point CSV, with each row's fields rearranged into
/// canonical order (`x,y` or `col,row,x,y`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCsv {
    /// Layout found in the header.
    pub kind: ControlCsvKind,
    /// Data rows, two or four fields each depending on `kind`.
    pub rows: Vec<Vec<String>>,
}

impl ControlCsv {
    /// The session command that imports these rows.
    #[must_use]
    pub fn into_command(self) -> Command {
        match self.kind {
            ControlCsvKind::Ordered => Command::ImportGeo { rows: self.rows },
            ControlCsvKind::ByPixel => Command::ImportGeoByPixel { rows: self.rows },
        }
    }
}

/// Layout problems in a control point CSV.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsvError {
    /// The file has no header line.
    #[error("CSV file is empty")]
    Empty,

    /// The header lacks the `x` or `y` column.
    #[error("CSV header must contain x and y columns (optionally col and row), found {header:?}")]
    MissingColumns { header: String },

    /// The header is present but no data rows follow.
    #[error("CSV file has no data rows")]
    NoRows,
}

/// Parse control point CSV text.
///
/// Blank lines are skipped. A row with fewer fields than the header is
/// padded with empty fields, which the core then reports as malformed
/// with the row's position.
///
/// # Errors
///
/// Returns a [`CsvError`] when the header is missing or lacks `x`/`y`, or
/// when there are no data rows.
pub fn parse_control_csv(text: &str) -> Result<ControlCsv, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines.next().ok_or(CsvError::Empty)?;
    let header: Vec<String> = split_fields(header_line)
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    let column = |name: &str| header.iter().position(|h| h == name);

    let (Some(x), Some(y)) = (column("x"), column("y")) else {
        return Err(CsvError::MissingColumns {
            header: header_line.trim().to_string(),
        });
    };
    let (kind, indices) = match (column("col"), column("row")) {
        (Some(col), Some(row)) => (ControlCsvKind::ByPixel, vec![col, row, x, y]),
        _ => (ControlCsvKind::Ordered, vec![x, y]),
    };

    let rows: Vec<Vec<String>> = lines
        .map(|line| {
            let fields = split_fields(line);
            indices
                .iter()
                .map(|&i| fields.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    if rows.is_empty() {
        return Err(CsvError::NoRows);
    }
    Ok(ControlCsv { kind, rows })
}

/// Read and parse a control point CSV file.
///
/// # Errors
///
/// Returns [`IoError::Read`] if the file cannot be read and
/// [`IoError::Csv`] if its layout is unusable.
pub fn read_control_csv(path: &Path) -> Result<ControlCsv, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let csv = parse_control_csv(&text).map_err(|source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        "read {} {:?} rows from {}",
        csv.rows.len(),
        csv.kind,
        path.display()
    );
    Ok(csv)
}

/// Comma-separated fields, trimmed. A double-quoted field may contain
/// commas, and `""` inside it is a literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| (*s).to_string()).collect())
            .collect()
    }

    #[test]
    fn ordered_layout() {
        let csv = parse_control_csv("x,y\n-110,24\n-109,24\n\n-110,23\n").unwrap();
        assert_eq!(csv.kind, ControlCsvKind::Ordered);
        assert_eq!(
            csv.rows,
            strings(&[&["-110", "24"], &["-109", "24"], &["-110", "23"]])
        );
    }

    #[test]
    fn by_pixel_layout_any_order() {
        let csv = parse_control_csv("\u{feff}Y, X ,row,col,label\r\n24,-110,0,0,a\r\n").unwrap();
        assert_eq!(csv.kind, ControlCsvKind::ByPixel);
        assert_eq!(csv.rows, strings(&[&["0", "0", "-110", "24"]]));
    }

    #[test]
    fn quoted_fields() {
        let csv = parse_control_csv("\"x\",\"y\"\n\"1.5\",\"2\"\n").unwrap();
        assert_eq!(csv.rows, strings(&[&["1.5", "2"]]));
    }

    #[test]
    fn quoted_commas_stay_in_one_field() {
        let csv = parse_control_csv(
            "label,x,y\n\"north, \"\"gate\"\"\",-110,24\n\"south\",-109,23\n",
        )
        .unwrap();
        assert_eq!(csv.rows, strings(&[&["-110", "24"], &["-109", "23"]]));
        assert_eq!(
            split_fields("\"north, \"\"gate\"\"\", 1"),
            ["north, \"gate\"", "1"]
        );
    }

    #[test]
    fn short_rows_are_padded() {
        let csv = parse_control_csv("x,y\n1\n").unwrap();
        assert_eq!(csv.rows, strings(&[&["1", ""]]));
    }

    #[test]
    fn layout_errors() {
        assert_eq!(parse_control_csv(""), Err(CsvError::Empty));
        assert_eq!(parse_control_csv("\u{feff}\n\n"), Err(CsvError::Empty));
        assert_eq!(parse_control_csv("x,y\n"), Err(CsvError::NoRows));
        assert!(matches!(
            parse_control_csv("lon,lat\n1,2\n"),
            Err(CsvError::MissingColumns { .. })
        ));
    }

    #[test]
    fn command_matches_layout() {
        let ordered = parse_control_csv("x,y\n1,2\n").unwrap().into_command();
        assert!(matches!(ordered, Command::ImportGeo { .. }));
        let by_pixel = parse_control_csv("col,row,x,y\n0,0,1,2\n")
            .unwrap()
            .into_command();
        assert!(matches!(by_pixel, Command::ImportGeoByPixel { .. }));
    }

    #[test]
    fn read_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let err = read_control_csv(&missing).unwrap_err();
        assert_eq!(err.path(), missing);

        let bad = dir.path().join("bad.csv");
        std::fs::write(&bad, "a,b\n1,2\n").unwrap();
        let err = read_control_csv(&bad).unwrap_err();
        assert!(matches!(err, IoError::Csv { .. }));
        assert!(err.to_string().contains("bad.csv"));
    }
}
