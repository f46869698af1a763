//! georef-io: Filesystem I/O for georef.
//!
//! Reads control point CSV files and command scripts, and writes export
//! output atomically. Encoding and all georeferencing logic live in the
//! sans-IO crates; this crate only moves bytes between them and disk.

pub mod control_csv;
pub mod error;
pub mod script;
pub mod write;

pub use control_csv::{ControlCsv, ControlCsvKind, CsvError, parse_control_csv, read_control_csv};
pub use error::IoError;
pub use script::{ScriptStep, load_script, parse_script};
pub use write::{
    shapefile_files, vertices_csv_path, world_file_path, write_all_atomic, write_atomic,
};
