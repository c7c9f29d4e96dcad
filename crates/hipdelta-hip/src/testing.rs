//! In-memory HIP archive builder for tests.
//!
//! Builds archives byte by byte, independently of [`crate::HipWriter`], so
//! reader and writer tests do not validate the format against themselves.
//! Asset filenames are emitted non-empty here to exercise the reader's
//! checksum seek.

use crate::format::{alignment_padding, ASSET_ALIGNMENT, FILLER};
use crate::layer::LayerEntry;

struct FixtureAsset {
    id: u32,
    asset_type: [u8; 4],
    name: String,
    data: Vec<u8>,
}

/// Builder for complete, valid HIP archives.
///
/// ```
/// use hipdelta_hip::testing::ArchiveBuilder;
///
/// let bytes = ArchiveBuilder::new()
///     .asset(1, "a", b"XXXX")
///     .layer(3, &[1])
///     .build();
/// assert_eq!(&bytes[..4], b"HIPA");
/// ```
pub struct ArchiveBuilder {
    platform: Vec<u8>,
    created: String,
    assets: Vec<FixtureAsset>,
    layers: Vec<LayerEntry>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// Platform payload selecting the standard variant.
    pub const STANDARD_PLATFORM: &'static [u8] = b"\0\0\0\x02GCPC\0\0Standard";
    /// Platform payload selecting the legacy variant.
    pub const LEGACY_PLATFORM: &'static [u8] = b"\0\0\0\x08GameCube\0\0\0\0";
    /// Raw timestamp stored in PCRT and PMOD.
    pub const TIMESTAMP: u32 = 0x3F00_0000;

    pub fn new() -> Self {
        Self {
            platform: Self::STANDARD_PLATFORM.to_vec(),
            created: "Fri Jul 11 14:22:08 2003\n".to_string(),
            assets: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Checksum written for an asset id.
    pub const fn checksum_for(id: u32) -> u32 {
        id ^ 0xA5A5_A5A5
    }

    /// Replace the platform payload.
    pub fn platform(mut self, platform: &[u8]) -> Self {
        self.platform = platform.to_vec();
        self
    }

    /// Replace the PCRT creation text.
    pub fn created_text(mut self, text: &str) -> Self {
        self.created = text.to_string();
        self
    }

    /// Add an asset of type `BINA`.
    pub fn asset(self, id: u32, name: &str, data: &[u8]) -> Self {
        self.asset_with(id, *b"BINA", name, data)
    }

    /// Add an asset with an explicit type.
    pub fn asset_with(mut self, id: u32, asset_type: [u8; 4], name: &str, data: &[u8]) -> Self {
        self.assets.push(FixtureAsset {
            id,
            asset_type,
            name: name.to_string(),
            data: data.to_vec(),
        });
        self
    }

    /// Add a layer directory entry.
    pub fn layer(mut self, type_code: u32, members: &[u32]) -> Self {
        self.layers.push(LayerEntry {
            type_code,
            members: members.to_vec(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        block(&mut out, b"HIPA", &[]);
        let mut pack = Vec::new();
        block(&mut pack, b"PVER", &words(&[2, 1, 0x0004_0000]));
        block(&mut pack, b"PFLG", &words(&[0x2E]));
        block(&mut out, b"PACK", &pack);

        block(
            &mut out,
            b"PCNT",
            &words(&[self.assets.len() as u32, self.layers.len() as u32, 0, 0, 0]),
        );

        let mut created = Self::TIMESTAMP.to_be_bytes().to_vec();
        created.extend_from_slice(&padded(self.created.as_bytes()));
        block(&mut out, b"PCRT", &created);
        block(&mut out, b"PMOD", &words(&[Self::TIMESTAMP]));
        block(&mut out, b"PLAT", &self.platform);

        // Directory, with offset fields patched once data positions are known.
        let mut atoc = Vec::new();
        block(&mut atoc, b"AINF", &words(&[0]));
        let mut offset_fields = Vec::new();
        for asset in &self.assets {
            let name = padded(asset.name.as_bytes());
            let filename = padded(format!("{}.raw", asset.name).as_bytes());

            let mut adbg = words(&[16]);
            adbg.extend_from_slice(&name);
            adbg.extend_from_slice(&filename);
            adbg.extend_from_slice(&Self::checksum_for(asset.id).to_be_bytes());

            let size = asset.data.len() as u32;
            let pad = alignment_padding(u64::from(size), ASSET_ALIGNMENT);
            let asset_type = u32::from_be_bytes(asset.asset_type);
            let mut ahdr = words(&[asset.id, asset_type, 0, size, pad, 0]);
            block(&mut ahdr, b"ADBG", &adbg);

            // id, type, then the offset field
            offset_fields.push(atoc.len() + 8 + 8);
            block(&mut atoc, b"AHDR", &ahdr);
        }

        let mut ltoc = Vec::new();
        block(&mut ltoc, b"LINF", &words(&[0]));
        for layer in &self.layers {
            let mut lhdr = words(&[layer.type_code, layer.members.len() as u32]);
            lhdr.extend_from_slice(&words(&layer.members));
            block(&mut ltoc, b"LHDR", &lhdr);
            block(&mut ltoc, b"LDBG", &words(&[u32::MAX]));
        }

        let mut dict = Vec::new();
        let atoc_start = 8;
        block(&mut dict, b"ATOC", &atoc);
        block(&mut dict, b"LTOC", &ltoc);

        let dict_start = out.len() + 8;
        block(&mut out, b"DICT", &dict);

        // STRM header, DHDR, DPAK header
        let data_start = out.len() + 8 + 12 + 8;
        let mut dpak = Vec::new();
        for (asset, field) in self.assets.iter().zip(&offset_fields) {
            let offset = (data_start + dpak.len()) as u32;
            let at = dict_start + atoc_start + field;
            out[at..at + 4].copy_from_slice(&offset.to_be_bytes());

            dpak.extend_from_slice(&asset.data);
            let pad = alignment_padding(dpak.len() as u64, ASSET_ALIGNMENT);
            dpak.resize(dpak.len() + pad as usize, FILLER);
        }

        let mut strm = Vec::new();
        block(&mut strm, b"DHDR", &words(&[u32::MAX]));
        block(&mut strm, b"DPAK", &dpak);
        block(&mut out, b"STRM", &strm);

        out
    }
}

fn block(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(tag);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
}

fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

fn padded(text: &[u8]) -> Vec<u8> {
    let mut out = text.to_vec();
    out.push(0);
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out
}
