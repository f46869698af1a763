//! Errors produced by the export encoders.

/// Failure while encoding or decoding an export format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// A vertex of this polygon mapped to NaN or infinity.
    #[error("polygon {polygon} maps to a non-finite geographic coordinate")]
    NonFiniteCoordinate {
        /// Id of the offending polygon.
        polygon: u32,
    },

    /// The output exceeds a size limit of the format.
    #[error("{what} is too large for the shapefile format")]
    TooLarge {
        /// Which count or length overflowed.
        what: &'static str,
    },

    /// A world file did not contain exactly six values.
    #[error("world file must contain 6 values, found {found}")]
    WorldFileLength {
        /// Number of non-blank lines found.
        found: usize,
    },

    /// A world file line was not a finite number.
    #[error("world file line {line} is not a finite number: {text:?}")]
    WorldFileValue {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
}
