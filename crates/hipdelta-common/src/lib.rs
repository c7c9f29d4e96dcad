//! Common utilities for hipdelta.
//!
//! This crate provides the byte-order primitives every other hipdelta crate
//! builds on:
//!
//! - [`BinaryReader`] - Seekable big-endian cursor over any `Read + Seek` source
//! - [`BinaryWriter`] - Seekable big-endian writer with [`Deferred`] backpatching
//! - [`text`] - Fixed-width name fields and even-padded output strings

mod error;
mod reader;
mod writer;

pub mod text;

pub use error::{Error, Result};
pub use reader::{regions_equal, BinaryReader};
pub use writer::{BinaryWriter, Deferred};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
