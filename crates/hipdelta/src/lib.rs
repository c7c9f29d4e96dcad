//! hipdelta - incremental patch archives for HIP asset archives.
//!
//! Given an original archive and a modified copy, builds a third archive
//! holding only what changed: assets that are new or whose data differs,
//! plus an 8-byte placeholder for every asset that was removed. Each asset
//! keeps the layer it occupies in its source archive.
//!
//! # Crates
//!
//! - [`hipdelta_common`] - Stream cursor, deferred writes, name codecs
//! - [`hipdelta_hip`] - HIP archive reading and writing
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{BufReader, BufWriter};
//!
//! use hipdelta::prelude::*;
//!
//! let original = BufReader::new(File::open("hb01.hip")?);
//! let modified = BufReader::new(File::open("hb01_mod.hip")?);
//!
//! let mut session = DeltaSession::new(original, modified);
//! let delta = session.plan(&mut |event| println!("{event}"))?;
//!
//! let output = BufWriter::new(File::create("output.hip")?);
//! let summary = session.write(delta, output)?;
//! println!("{} asset(s) written", summary.written.asset_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod diff;
mod error;
pub mod layers;
mod progress;
mod session;

pub use hipdelta_common as common;
pub use hipdelta_hip as hip;

pub use error::{Error, Result, Side};
pub use progress::Progress;
pub use session::{Delta, DeltaOptions, DeltaSession, DeltaSummary};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::diff::{select_changed, Change};
    pub use crate::layers::{reconstruct, LayerPlan};
    pub use crate::{Delta, DeltaOptions, DeltaSession, DeltaSummary, Progress};
    pub use hipdelta_common::BinaryReader;
    pub use hipdelta_hip::{Asset, HipArchive, Timestamp, Variant};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
