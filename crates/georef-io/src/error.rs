//! Filesystem errors. Every variant names the file involved.

use std::path::PathBuf;

use crate::control_csv::CsvError;

/// Failure reading or writing a georef file.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written or moved into place.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The file involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A control point CSV had an unusable layout.
    #[error("{}: {source}", path.display())]
    Csv {
        /// The file involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: CsvError,
    },

    /// A command script was not valid JSON or named an unknown command.
    #[error("invalid script {}: {source}", path.display())]
    Script {
        /// The file involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

impl IoError {
    /// The file the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Csv { path, .. }
            | Self::Script { path, .. } => path,
        }
    }
}
