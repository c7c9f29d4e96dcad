//! Error types for delta building.

use std::fmt;

use thiserror::Error;

/// Which input archive an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Modified,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str("original"),
            Self::Modified => f.write_str("modified"),
        }
    }
}

/// Errors that can occur while building a delta archive.
#[derive(Debug, Error)]
pub enum Error {
    /// An input archive could not be read.
    #[error("{side} archive")]
    Input {
        side: Side,
        #[source]
        source: hipdelta_hip::Error,
    },

    /// The platform blocks of the two archives differ in length.
    #[error("Platform info does not match ({original_len} vs {modified_len} bytes)")]
    PlatformMismatch {
        original_len: usize,
        modified_len: usize,
    },

    /// The platform blocks have the same length but different bytes.
    #[error("Platform info does not match (first difference at byte {offset})")]
    PlatformContentMismatch { offset: usize },

    /// HIP format error while writing.
    #[error(transparent)]
    Hip(#[from] hipdelta_hip::Error),

    /// Common library error.
    #[error(transparent)]
    Common(#[from] hipdelta_common::Error),
}

impl Error {
    pub(crate) fn input(side: Side) -> impl FnOnce(hipdelta_hip::Error) -> Self {
        move |source| Self::Input { side, source }
    }
}

/// Result type for delta operations.
pub type Result<T> = std::result::Result<T, Error>;
