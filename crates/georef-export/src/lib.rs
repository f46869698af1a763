//! georef-export: Pure format serializers (sans-IO)
//!
//! Converts a fitted transform and digitized polygons into output
//! formats: world file, flat vertex CSV and ESRI shapefile. Every
//! encoder is a pure function returning in-memory data; writing files
//! is left to `georef-io`.

pub mod dbf;
pub mod error;
pub mod shapefile;
pub mod vertices;
pub mod world_file;

pub use dbf::DbfDate;
pub use error::ExportError;
pub use shapefile::{ShapefileLayer, ShapefileMetadata, to_shapefile};
pub use vertices::to_vertex_csv;
pub use world_file::{parse_world_file, to_world_file, world_file_extension};
