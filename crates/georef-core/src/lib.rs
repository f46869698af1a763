//! georef-core: georeferencing and polygon digitizing (sans-IO).
//!
//! Turns a raster image into geographic vector data through:
//! control points -> least-squares affine fit -> pixel/geo mapping,
//! alongside a click-driven polygon digitizer working in pixel space.
//!
//! This crate has **no I/O dependencies** -- CSV rows arrive as string
//! fields and polygons leave as plain data. Encoding lives in
//! `georef-export`; filesystem access lives in `georef-io`.

pub mod affine;
pub mod config;
pub mod control;
pub mod digitize;
pub mod error;
pub mod estimate;
pub mod mapper;
pub mod session;
pub mod types;
pub mod winding;

pub use affine::AffineTransform;
pub use config::{GeorefConfig, ImportPolicy};
pub use control::{ControlPointStore, CountMismatchWarning, ImportReport};
pub use digitize::{ClickOutcome, DigitizingSession, DrawMode, Preview, RingState};
pub use error::{ControlPointError, DigitizeError, EstimateError, MappingError, SessionError};
pub use estimate::{AffineEstimator, FitReport, Residual};
pub use mapper::CoordinateMapper;
pub use session::{Command, CommandOutcome, PolygonSummary, Session, TransformStatus};
pub use types::{ControlPoint, GeoCoord, Point, Polygon, Ring};
