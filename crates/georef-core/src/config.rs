//! Session configuration.

use serde::{Deserialize, Serialize};

/// How geographic rows are matched to control points when the counts differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Assign as many rows as there are points and report the mismatch.
    #[default]
    Truncate,
    /// Reject the whole import when row and point counts differ.
    Strict,
}

/// Configuration for a georeferencing session and its exports.
///
/// All parameters have defaults suitable for interactive use; the CLI
/// accepts a full JSON serialization via `--config-json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeorefConfig {
    /// Relative threshold below which the centred pixel scatter matrix is
    /// considered singular (control points collinear).
    pub collinearity_tolerance: f64,

    /// Relative threshold below which the transform's 2×2 linear part is
    /// considered non-invertible.
    pub singular_tolerance: f64,

    /// Behavior of ordered CSV import when rows and points disagree.
    pub import_policy: ImportPolicy,

    /// Decimal places written to world files (trailing zeros trimmed).
    pub world_file_decimals: usize,

    /// Coordinate system tag written verbatim to the `.prj` file.
    ///
    /// The core never interprets this value.
    pub coordinate_system: String,

    /// Width in bytes of the shapefile `NAME` attribute.
    pub name_field_width: u8,
}

impl GeorefConfig {
    /// Default for [`collinearity_tolerance`](Self::collinearity_tolerance).
    pub const DEFAULT_COLLINEARITY_TOLERANCE: f64 = 1e-10;
    /// Default for [`singular_tolerance`](Self::singular_tolerance).
    pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-12;
    /// Default for [`world_file_decimals`](Self::world_file_decimals).
    pub const DEFAULT_WORLD_FILE_DECIMALS: usize = 12;
    /// Default for [`name_field_width`](Self::name_field_width).
    pub const DEFAULT_NAME_FIELD_WIDTH: u8 = 50;
    /// WGS 84 geographic coordinate system, the usual target for typed
    /// longitude/latitude pairs.
    pub const WGS84_WKT: &'static str = concat!(
        r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984","#,
        r#"SPHEROID["WGS_1984",6378137.0,298.257223563]],"#,
        r#"PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#,
    );
}

impl Default for GeorefConfig {
    fn default() -> Self {
        Self {
            collinearity_tolerance: Self::DEFAULT_COLLINEARITY_TOLERANCE,
            singular_tolerance: Self::DEFAULT_SINGULAR_TOLERANCE,
            import_policy: ImportPolicy::default(),
            world_file_decimals: Self::DEFAULT_WORLD_FILE_DECIMALS,
            coordinate_system: Self::WGS84_WKT.to_string(),
            name_field_width: Self::DEFAULT_NAME_FIELD_WIDTH,
        }
    }
}
