//! HIP asset archive reader and writer.
//!
//! HIP archives bundle the assets of one game area or level. The file is a
//! tree of tagged blocks, each a four-character tag followed by a
//! big-endian 32-bit payload length.
//!
//! # File Format
//!
//! ```text
//! HIPA                    magic, empty
//! PACK                    PVER, PFLG
//! PCNT                    asset count, layer count, 3 unused words
//! PCRT                    creation time (raw + text)
//! PMOD                    modification time
//! PLAT                    platform description
//! DICT
//!   ATOC                  asset directory
//!     AINF
//!     AHDR                id, type, offset, size, pad, flags
//!       ADBG              alignment, name, filename, checksum
//!   LTOC                  layer directory
//!     LINF
//!     LHDR                type code, member count, member ids
//!     LDBG
//! STRM
//!   DHDR
//!   DPAK                  packed asset data
//! ```
//!
//! All integers are big-endian.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use hipdelta_common::BinaryReader;
//! use hipdelta_hip::HipArchive;
//!
//! let mut reader = BinaryReader::new(BufReader::new(File::open("hb01.hip")?));
//! let archive = HipArchive::read(&mut reader)?;
//!
//! for asset in archive.assets() {
//!     println!("[{:08x}] {} {}", asset.id, asset.type_tag(), asset.display_name());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod asset;
mod error;
mod format;
mod layer;
mod timestamp;
mod writer;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use archive::{load_data, HipArchive, Platform};
pub use asset::{Asset, DUMMY_SIZE, DUMMY_TYPE};
pub use error::{Error, Result};
pub use format::{
    alignment_padding, AssetRecord, Counts, Tag, ASSET_ALIGNMENT, FILLER, STREAM_ALIGNMENT,
};
pub use layer::{Layer, LayerEntry, Variant, LAYER_SLOTS};
pub use timestamp::Timestamp;
pub use writer::{HipWriter, WriteSummary};
