//! HIP archive reader.
//!
//! Reading is directory-only: the header counts, the platform block, every
//! asset descriptor, and the layer directory. Asset data stays on disk until
//! somebody asks for it with [`load_data`].

use std::io::{Read, Seek};

use hipdelta_common::BinaryReader;

use crate::asset::Asset;
use crate::format::{
    AssetRecord, Counts, Tag, ASSET_DIRECTORY_SKIP, BLOCK_HEADER_LEN, COUNTS_OFFSET,
    CREATED_LEN_OFFSET, LAYER_DEBUG_LEN, LAYER_DIRECTORY_SKIP, PLATFORM_LEN_SKIP,
};
use crate::layer::{LayerEntry, Variant};
use crate::{Error, Result};

/// The PLAT block of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Absolute offset of the payload in the source archive.
    offset: u64,
    bytes: Vec<u8>,
}

impl Platform {
    pub fn new(offset: u64, bytes: Vec<u8>) -> Self {
        Self { offset, bytes }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Offset of the first byte where two equal-length blocks differ.
    ///
    /// `None` when the blocks are identical or differ in length.
    pub fn first_difference(&self, other: &Self) -> Option<usize> {
        if self.len() != other.len() {
            return None;
        }
        self.bytes.iter().zip(&other.bytes).position(|(a, b)| a != b)
    }

    /// The engine variant this platform block selects.
    pub fn variant(&self) -> Variant {
        Variant::from_platform(&self.bytes)
    }
}

/// The directory of one HIP archive.
#[derive(Debug, Clone)]
pub struct HipArchive {
    asset_count: u32,
    layer_count: u32,
    platform: Platform,
    assets: Vec<Asset>,
    layers: Vec<LayerEntry>,
}

impl HipArchive {
    /// Parse the archive directory from a stream.
    ///
    /// Fails with [`Error::NotHip`] if the stream does not start with the
    /// HIPA magic.
    pub fn read<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<Self> {
        reader.seek(0)?;
        match reader.expect_magic(&Tag::HIPA.0) {
            Ok(()) => {}
            Err(hipdelta_common::Error::InvalidMagic { actual, .. }) => {
                return Err(Error::NotHip { actual })
            }
            Err(e) => return Err(e.into()),
        }

        reader.seek(COUNTS_OFFSET)?;
        let counts: Counts = reader.read_struct()?;
        let asset_count = counts.asset_count.get();
        let layer_count = counts.layer_count.get();

        let platform = read_platform(reader)?;
        log::debug!(
            "platform block: {} bytes at {:#x}, {} variant",
            platform.len(),
            platform.offset(),
            platform.variant()
        );

        reader.advance(ASSET_DIRECTORY_SKIP)?;
        let mut assets = Vec::new();
        for _ in 0..asset_count {
            assets.push(read_asset(reader)?);
        }

        reader.advance(LAYER_DIRECTORY_SKIP)?;
        let mut layers = Vec::new();
        for _ in 0..layer_count {
            layers.push(read_layer_entry(reader)?);
        }

        log::debug!("read {asset_count} asset(s) in {layer_count} layer(s)");

        Ok(Self {
            asset_count,
            layer_count,
            platform,
            assets,
            layers,
        })
    }

    /// Asset count from the PCNT block.
    pub fn asset_count(&self) -> u32 {
        self.asset_count
    }

    /// Layer count from the PCNT block.
    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Asset descriptors in directory order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut [Asset] {
        &mut self.assets
    }

    /// Take the asset descriptors out of the archive.
    pub fn take_assets(&mut self) -> Vec<Asset> {
        std::mem::take(&mut self.assets)
    }

    /// Layer directory entries in directory order.
    pub fn layers(&self) -> &[LayerEntry] {
        &self.layers
    }

    /// Find an asset by id.
    pub fn find(&self, id: u32) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }
}

/// Locate and capture the PLAT block.
///
/// The PLAT length field sits right after the PMOD block, whose position
/// depends on the variable-length PCRT block before it.
fn read_platform<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<Platform> {
    reader.seek(CREATED_LEN_OFFSET)?;
    let created_len = reader.read_u32()?;
    reader.advance(u64::from(created_len) + PLATFORM_LEN_SKIP)?;

    let len = reader.read_u32()?;
    let offset = reader.position()?;
    let bytes = reader.read_bytes(len as usize)?;

    Ok(Platform::new(offset, bytes))
}

/// Read one AHDR block, leaving the reader at its end.
///
/// The checksum is the last field of the nested ADBG block, after the
/// variable-length name and filename, so its position is computed from the
/// ADBG length and reached with an absolute seek.
fn read_asset<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<Asset> {
    reader.advance(BLOCK_HEADER_LEN)?;
    let record: AssetRecord = reader.read_struct()?;

    reader.advance(4)?;
    let debug_len = reader.read_u32()?;
    let checksum_pos = (reader.position()? + u64::from(debug_len))
        .checked_sub(4)
        .ok_or(Error::ValueOutOfRange {
            what: "ADBG length",
            value: u64::from(debug_len),
        })?;

    let alignment = reader.read_u32()?;
    let name = reader.read_fixed_name()?;

    reader.seek(checksum_pos)?;
    let checksum = reader.read_u32()?;

    Ok(Asset {
        id: record.id.get(),
        asset_type: record.asset_type.get(),
        offset: record.offset.get(),
        size: record.size.get(),
        pad: record.pad.get(),
        flags: record.flags.get(),
        alignment,
        name,
        checksum,
        data: None,
        matched: false,
    })
}

/// Read one LHDR entry and skip its trailing LDBG block.
fn read_layer_entry<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<LayerEntry> {
    reader.advance(BLOCK_HEADER_LEN)?;
    let type_code = reader.read_u32()?;
    let count = reader.read_u32()?;

    let mut members = Vec::new();
    for _ in 0..count {
        members.push(reader.read_u32()?);
    }
    reader.advance(LAYER_DEBUG_LEN)?;

    Ok(LayerEntry { type_code, members })
}

/// Load the data of `asset` from its source archive.
pub fn load_data<R: Read + Seek>(reader: &mut BinaryReader<R>, asset: &mut Asset) -> Result<()> {
    let data = reader.read_bytes_at(u64::from(asset.offset), asset.size as usize)?;
    asset.data = Some(data);
    Ok(())
}
