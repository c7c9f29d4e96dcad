//! Error types for hipdelta-common.

use thiserror::Error;

/// Common error type for hipdelta stream operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// A length or offset does not fit the field it has to be stored in.
    #[error("{what} out of range: {value}")]
    ValueOutOfRange { what: &'static str, value: u64 },

    /// A buffer for stream data could not be allocated.
    #[error("failed to allocate {0} bytes")]
    Allocation(usize),

    /// Structure could not be decoded from the bytes read.
    #[error("cannot decode {0} from stream bytes")]
    Layout(&'static str),

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
