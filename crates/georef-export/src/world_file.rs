//! World file (`.pgw`, `.jgw`, `.tfw`, ...) serializer and parser.
//!
//! A world file is six newline-terminated numbers in the order
//! `a, d, b, e, c, f`: pixel width, the two rotation terms, pixel height
//! (normally negative), then the longitude and latitude of the top-left
//! pixel.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;

use georef_core::AffineTransform;

use crate::error::ExportError;

/// Serialize `transform` as world file text.
///
/// Each coefficient is rounded to `decimals` places, trailing zeros are
/// trimmed but at least one fractional digit is kept, and negative zero
/// is written as `0.0`.
///
/// # Examples
///
/// ```
/// use georef_core::AffineTransform;
/// use georef_export::world_file::to_world_file;
///
/// let t = AffineTransform::new(0.01, 0.0, -110.0, 0.0, -0.01, 24.0);
/// assert_eq!(to_world_file(&t, 12), "0.01\n0.0\n0.0\n-0.01\n-110.0\n24.0\n");
/// ```
#[must_use]
pub fn to_world_file(transform: &AffineTransform, decimals: usize) -> String {
    let [a, b, c, d, e, f] = transform.coefficients();
    let mut out = String::new();
    for value in [a, d, b, e, c, f] {
        let _ = writeln!(out, "{}", format_coefficient(value, decimals));
    }
    out
}

/// Read world file text back into a transform.
///
/// Blank lines and surrounding whitespace are ignored.
///
/// # Errors
///
/// Returns [`ExportError::WorldFileValue`] for a line that is not a
/// finite number and [`ExportError::WorldFileLength`] unless exactly six
/// values are present.
pub fn parse_world_file(text: &str) -> Result<AffineTransform, ExportError> {
    let values = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let line = line.trim();
            line.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ExportError::WorldFileValue {
                    line: i + 1,
                    text: line.to_string(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let [a, d, b, e, c, f] = values[..] else {
        return Err(ExportError::WorldFileLength {
            found: values.len(),
        });
    };
    Ok(AffineTransform::new(a, b, c, d, e, f))
}

/// Conventional world file extension for an image extension.
///
/// Three-letter extensions take their first and last letter plus `w`
/// (`png` -> `pgw`, `jpg` -> `jgw`, `tif` -> `tfw`). Anything else gets
/// the image extension with `w` appended (`jpeg` -> `jpegw`), which GDAL
/// also accepts. Case is preserved per letter position.
#[must_use]
pub fn world_file_extension(image_ext: &str) -> String {
    let ext = image_ext.trim_start_matches('.');
    let chars: Vec<char> = ext.chars().collect();
    let w = if chars.last().is_some_and(char::is_ascii_uppercase) {
        'W'
    } else {
        'w'
    };
    match chars[..] {
        [first, _, last] => [first, last, w].iter().collect(),
        _ => {
            let mut out = ext.to_string();
            out.push(w);
            out
        }
    }
}

fn format_coefficient(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut s = format!("{value:.decimals$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').len();
        s.truncate(trimmed);
        if s.ends_with('.') {
            s.push('0');
        }
    } else {
        s.push_str(".0");
    }
    if s == "-0.0" {
        s.remove(0);
    }
    s
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_lines() {
        let t = AffineTransform::new(0.01, 0.0, -110.0, 0.0, -0.01, 24.0);
        let text = to_world_file(&t, 12);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["0.01", "0.0", "0.0", "-0.01", "-110.0", "24.0"]);
    }

    #[test]
    fn order_is_a_d_b_e_c_f() {
        let t = AffineTransform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(to_world_file(&t, 6), "1.0\n4.0\n2.0\n5.0\n3.0\n6.0\n");
    }

    #[test]
    fn rounding_hides_float_noise() {
        // Typical least-squares output.
        let t = AffineTransform::new(
            0.010_000_000_000_000_002,
            -1.3e-18,
            -110.000_000_000_000_01,
            2.1e-19,
            -0.009_999_999_999_999_998,
            24.0,
        );
        assert_eq!(
            to_world_file(&t, 12),
            "0.01\n0.0\n0.0\n-0.01\n-110.0\n24.0\n"
        );
    }

    #[test]
    fn negative_zero_prints_positive() {
        assert_eq!(format_coefficient(-0.0, 12), "0.0");
        assert_eq!(format_coefficient(-1e-20, 12), "0.0");
    }

    #[test]
    fn zero_decimals() {
        assert_eq!(format_coefficient(-110.4, 0), "-110.0");
        assert_eq!(format_coefficient(2.5e-3, 0), "0.0");
    }

    #[test]
    fn parse_round_trip() {
        let t = AffineTransform::new(0.25, 0.001, 500_000.5, -0.002, -0.25, 4_000_000.25);
        assert_eq!(parse_world_file(&to_world_file(&t, 12)).unwrap(), t);
    }

    #[test]
    fn parse_tolerates_whitespace() {
        let t = parse_world_file("  1.0\r\n0\n\n0\n-1\n10\n20\n\n").unwrap();
        assert_eq!(t, AffineTransform::new(1.0, 0.0, 10.0, 0.0, -1.0, 20.0));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            parse_world_file("1\n0\n0\n-1\n10\n"),
            Err(ExportError::WorldFileLength { found: 5 })
        );
        assert_eq!(
            parse_world_file("1\n0\nzero\n-1\n10\n20\n"),
            Err(ExportError::WorldFileValue {
                line: 3,
                text: "zero".to_string()
            })
        );
        assert!(matches!(
            parse_world_file("1\n0\n0\n-1\n10\nNaN\n"),
            Err(ExportError::WorldFileValue { line: 6, .. })
        ));
    }

    #[test]
    fn extensions() {
        assert_eq!(world_file_extension("png"), "pgw");
        assert_eq!(world_file_extension(".jpg"), "jgw");
        assert_eq!(world_file_extension("tif"), "tfw");
        assert_eq!(world_file_extension("PNG"), "PGW");
        assert_eq!(world_file_extension("jpeg"), "jpegw");
    }
}
