//! HIP archive writer.
//!
//! An output archive is emitted front to back in one pass. Every field whose
//! value depends on later content (section lengths, asset offsets, asset
//! padding) is reserved with a zero placeholder and resolved once the
//! content it describes has been written.
//!
//! Layout of the emitted archive:
//!
//! ```text
//! HIPA PACK PVER PFLG   copied from the source archive (0x30 bytes)
//! PCNT                  asset and layer counts
//! PCRT PMOD             creation time
//! PLAT                  platform block, copied
//! DICT
//!   ATOC  AINF AHDR(ADBG)...
//!   LTOC  LINF (LHDR LDBG)...
//! STRM
//!   DHDR
//!   DPAK  lead pad, then asset data each padded to 16 bytes
//! ```

use std::io::{Read, Seek, Write};

use hipdelta_common::text::{encode_name, encode_padded};
use hipdelta_common::{BinaryReader, BinaryWriter, Deferred};

use crate::archive::Platform;
use crate::asset::Asset;
use crate::error::to_u32;
use crate::format::{
    alignment_padding, Counts, Tag, ASSET_ALIGNMENT, FILLER, PREFIX_LEN, STREAM_ALIGNMENT,
};
use crate::layer::Layer;
use crate::timestamp::Timestamp;
use crate::{Error, Result};

/// Fixed part of an AHDR payload: six fields, the ADBG header, alignment,
/// the empty filename and the checksum.
const ASSET_HEADER_FIXED: u32 = 24 + 8 + 4 + 2 + 4;

/// Fixed part of an ADBG payload: alignment, empty filename, checksum.
const ASSET_DEBUG_FIXED: u32 = 4 + 2 + 4;

/// Totals of a written archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// AHDR entries written.
    pub asset_count: u32,
    /// LHDR entries written.
    pub layer_count: u32,
    /// Length of the DPAK payload.
    pub data_len: u32,
}

/// Placeholders of one AHDR entry, resolved when its data is written.
struct PendingAsset {
    index: usize,
    offset: Deferred,
    pad: Deferred,
}

/// Writes an archive from a finished asset and layer plan.
pub struct HipWriter<W> {
    out: BinaryWriter<W>,
}

impl<W: Write + Seek> HipWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BinaryWriter::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    /// Write a complete archive.
    ///
    /// `source` supplies the invariant header prefix. `layers` are written
    /// in order, skipping inactive ones; each member indexes into `assets`,
    /// and every referenced asset must have its data loaded.
    pub fn write<R: Read + Seek>(
        &mut self,
        source: &mut BinaryReader<R>,
        platform: &Platform,
        assets: &[Asset],
        layers: &[Layer],
        timestamp: &Timestamp,
    ) -> Result<WriteSummary> {
        let active: Vec<&Layer> = layers.iter().filter(|l| l.is_active()).collect();
        let asset_count = to_u32("asset count", active.iter().map(|l| l.len()).sum())?;
        let layer_count = to_u32("layer count", active.len())?;

        for &index in active.iter().flat_map(|l| l.members.iter()) {
            let asset = &assets[index];
            if asset.data.as_ref().map(Vec::len) != Some(asset.size as usize) {
                return Err(Error::MissingData { id: asset.id });
            }
        }

        self.write_prefix(source)?;
        self.write_counts(asset_count, layer_count)?;
        self.write_timestamp(timestamp)?;
        self.write_platform(platform)?;
        let pending = self.write_dictionary(assets, &active)?;
        let data_len = self.write_stream(assets, &pending)?;
        self.out.flush()?;

        log::debug!(
            "wrote {asset_count} asset(s) in {layer_count} layer(s), {data_len} data bytes"
        );

        Ok(WriteSummary {
            asset_count,
            layer_count,
            data_len,
        })
    }

    fn write_prefix<R: Read + Seek>(&mut self, source: &mut BinaryReader<R>) -> Result<()> {
        source.seek(0)?;
        let prefix = source.read_bytes(PREFIX_LEN as usize)?;
        self.out.write_bytes(&prefix)?;
        Ok(())
    }

    fn write_counts(&mut self, asset_count: u32, layer_count: u32) -> Result<()> {
        self.out.write_struct(&Tag::PCNT)?;
        self.out.write_u32(Counts::LEN)?;
        self.out.write_struct(&Counts::new(asset_count, layer_count))?;
        Ok(())
    }

    fn write_timestamp(&mut self, timestamp: &Timestamp) -> Result<()> {
        let text = encode_padded(timestamp.text().as_bytes());

        self.out.write_struct(&Tag::PCRT)?;
        self.out.write_u32(4 + to_u32("timestamp text", text.len())?)?;
        self.out.write_u32(timestamp.raw())?;
        self.out.write_bytes(&text)?;

        self.out.write_struct(&Tag::PMOD)?;
        self.out.write_u32(4)?;
        self.out.write_u32(timestamp.raw())?;
        Ok(())
    }

    fn write_platform(&mut self, platform: &Platform) -> Result<()> {
        self.out.write_struct(&Tag::PLAT)?;
        self.out.write_u32(to_u32("platform length", platform.len())?)?;
        self.out.write_bytes(platform.bytes())?;
        Ok(())
    }

    /// AINF/LINF: an info block carrying a single zero word.
    fn write_info(&mut self, tag: Tag) -> Result<()> {
        self.out.write_struct(&tag)?;
        self.out.write_u32(4)?;
        self.out.write_u32(0)?;
        Ok(())
    }

    /// LDBG/DHDR: a debug block carrying a single all-ones word.
    fn write_debug(&mut self, tag: Tag) -> Result<()> {
        self.out.write_struct(&tag)?;
        self.out.write_u32(4)?;
        self.out.write_u32(u32::MAX)?;
        Ok(())
    }

    fn write_dictionary(&mut self, assets: &[Asset], active: &[&Layer]) -> Result<Vec<PendingAsset>> {
        self.out.write_struct(&Tag::DICT)?;
        let dict_len = self.out.reserve_u32()?;
        let dict_start = self.out.position()?;

        self.out.write_struct(&Tag::ATOC)?;
        let atoc_len = self.out.reserve_u32()?;
        let atoc_start = self.out.position()?;
        self.write_info(Tag::AINF)?;

        let mut pending = Vec::new();
        for &index in active.iter().flat_map(|l| l.members.iter()) {
            let asset = &assets[index];
            let (offset, pad) = self.write_asset_header(asset)?;
            pending.push(PendingAsset { index, offset, pad });
        }
        self.resolve_len(atoc_len, atoc_start)?;

        self.out.write_struct(&Tag::LTOC)?;
        let ltoc_len = self.out.reserve_u32()?;
        let ltoc_start = self.out.position()?;
        self.write_info(Tag::LINF)?;

        for layer in active {
            let Some(type_code) = layer.type_code else {
                continue;
            };
            let members = to_u32("layer size", layer.len())?;

            self.out.write_struct(&Tag::LHDR)?;
            self.out.write_u32(8 + 4 * members)?;
            self.out.write_u32(type_code)?;
            self.out.write_u32(members)?;
            for &index in &layer.members {
                self.out.write_u32(assets[index].id)?;
            }
            self.write_debug(Tag::LDBG)?;
        }
        self.resolve_len(ltoc_len, ltoc_start)?;
        self.resolve_len(dict_len, dict_start)?;

        Ok(pending)
    }

    /// Write one AHDR block, returning the offset and padding placeholders.
    fn write_asset_header(&mut self, asset: &Asset) -> Result<(Deferred, Deferred)> {
        let name = encode_name(&asset.name);
        let name_len = to_u32("name length", name.len())?;

        self.out.write_struct(&Tag::AHDR)?;
        self.out.write_u32(ASSET_HEADER_FIXED + name_len)?;
        self.out.write_u32(asset.id)?;
        self.out.write_u32(asset.asset_type)?;
        let offset = self.out.reserve_u32()?;
        self.out.write_u32(asset.size)?;
        let pad = self.out.reserve_u32()?;
        self.out.write_u32(asset.flags)?;

        self.out.write_struct(&Tag::ADBG)?;
        self.out.write_u32(ASSET_DEBUG_FIXED + name_len)?;
        self.out.write_u32(asset.alignment)?;
        self.out.write_bytes(&name)?;
        // empty filename
        self.out.write_bytes(&[0, 0])?;
        self.out.write_u32(asset.checksum)?;

        Ok((offset, pad))
    }

    fn write_stream(&mut self, assets: &[Asset], pending: &[PendingAsset]) -> Result<u32> {
        self.out.write_struct(&Tag::STRM)?;
        let strm_len = self.out.reserve_u32()?;
        let strm_start = self.out.position()?;
        self.write_debug(Tag::DHDR)?;

        self.out.write_struct(&Tag::DPAK)?;
        let dpak_len = self.out.reserve_u32()?;
        let dpak_start = self.out.position()?;

        // The lead word counts itself plus the filler after it.
        let lead = alignment_padding(dpak_start + 4, STREAM_ALIGNMENT) + 4;
        self.out.write_u32(lead)?;
        self.out.write_fill(FILLER, lead as usize - 4)?;

        for entry in pending {
            let asset = &assets[entry.index];
            let data = asset
                .data
                .as_deref()
                .ok_or(Error::MissingData { id: asset.id })?;

            let offset = self.out.position_u32()?;
            self.out.write_bytes(data)?;
            let pad = alignment_padding(self.out.position()?, ASSET_ALIGNMENT);
            self.out.write_fill(FILLER, pad as usize)?;

            if pad != asset.pad {
                log::debug!(
                    "asset [{:08x}] padded by {pad} instead of {}",
                    asset.id,
                    asset.pad
                );
            }

            self.out.resolve(entry.offset, offset)?;
            self.out.resolve(entry.pad, pad)?;
        }

        let data_len = self.resolve_len(dpak_len, dpak_start)?;
        self.resolve_len(strm_len, strm_start)?;
        Ok(data_len)
    }

    /// Resolve a section length field with the bytes written since `start`.
    fn resolve_len(&mut self, field: Deferred, start: u64) -> Result<u32> {
        let len = self.out.position()? - start;
        let len = u32::try_from(len).map_err(|_| Error::ValueOutOfRange {
            what: "section length",
            value: len,
        })?;
        self.out.resolve(field, len)?;
        Ok(len)
    }
}
