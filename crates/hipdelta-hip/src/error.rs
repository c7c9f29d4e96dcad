//! Error types for HIP archive handling.

use thiserror::Error;

/// Errors that can occur when reading or writing HIP archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error(transparent)]
    Common(#[from] hipdelta_common::Error),

    /// The stream does not start with the HIPA magic.
    #[error("not a HIP file: expected magic \"HIPA\", got {actual:?}")]
    NotHip { actual: Vec<u8> },

    /// An asset scheduled for output has no data loaded.
    #[error("asset [{id:08x}] has no data loaded")]
    MissingData { id: u32 },

    /// A size or count does not fit its 32-bit on-disk field.
    #[error("{what} does not fit in 32 bits: {value}")]
    ValueOutOfRange { what: &'static str, value: u64 },
}

/// Result type for HIP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert a host-side length into its 32-bit on-disk form.
pub(crate) fn to_u32(what: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::ValueOutOfRange {
        what,
        value: value as u64,
    })
}
