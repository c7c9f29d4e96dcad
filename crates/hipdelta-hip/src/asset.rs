//! Asset descriptors.

use std::borrow::Cow;

use crate::format::Tag;

/// Type tag given to placeholder assets.
pub const DUMMY_TYPE: Tag = Tag(*b"TEXT");

/// Data length of a placeholder asset.
pub const DUMMY_SIZE: u32 = 8;

const DUMMY_NAME: &[u8] = b"dummy";

/// One entry of an archive's asset directory.
///
/// `data` is only loaded for assets that end up in an output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Identifier, unique within one archive.
    pub id: u32,
    /// Four-character type code.
    pub asset_type: u32,
    /// Offset of the data in the source archive.
    pub offset: u32,
    /// Length of the data.
    pub size: u32,
    /// Padding after the data in the output archive.
    pub pad: u32,
    pub flags: u32,
    /// Declared alignment, carried through unchanged.
    pub alignment: u32,
    /// Raw name bytes without terminator.
    pub name: Vec<u8>,
    pub checksum: u32,
    pub data: Option<Vec<u8>>,
    /// Set while diffing when a modified-archive asset has the same id.
    pub matched: bool,
}

impl Asset {
    /// Create a placeholder standing in for a removed asset.
    pub fn dummy(id: u32) -> Self {
        Self {
            id,
            asset_type: DUMMY_TYPE.to_u32(),
            offset: 0,
            size: DUMMY_SIZE,
            pad: 0,
            flags: 0,
            alignment: 0,
            name: DUMMY_NAME.to_vec(),
            checksum: 0,
            data: Some(vec![0u8; DUMMY_SIZE as usize]),
            matched: false,
        }
    }

    /// The asset type as a four-character code.
    pub fn type_tag(&self) -> Tag {
        Tag::from_u32(self.asset_type)
    }

    /// The name for display, with invalid UTF-8 replaced.
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Length of the data plus its output padding.
    pub fn padded_size(&self) -> u64 {
        u64::from(self.size) + u64::from(self.pad)
    }
}
