//! On-disk structures and layout constants.

use std::fmt;

use zerocopy::byteorder::big_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Four-character block tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const HIPA: Self = Self(*b"HIPA");
    pub const PCNT: Self = Self(*b"PCNT");
    pub const PCRT: Self = Self(*b"PCRT");
    pub const PMOD: Self = Self(*b"PMOD");
    pub const PLAT: Self = Self(*b"PLAT");
    pub const DICT: Self = Self(*b"DICT");
    pub const ATOC: Self = Self(*b"ATOC");
    pub const AINF: Self = Self(*b"AINF");
    pub const AHDR: Self = Self(*b"AHDR");
    pub const ADBG: Self = Self(*b"ADBG");
    pub const LTOC: Self = Self(*b"LTOC");
    pub const LINF: Self = Self(*b"LINF");
    pub const LHDR: Self = Self(*b"LHDR");
    pub const LDBG: Self = Self(*b"LDBG");
    pub const STRM: Self = Self(*b"STRM");
    pub const DHDR: Self = Self(*b"DHDR");
    pub const DPAK: Self = Self(*b"DPAK");

    /// Interpret a 32-bit asset type as its four-character code.
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    /// The tag as a big-endian 32-bit value.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// Length of the leading HIPA/PACK/PVER/PFLG region, copied verbatim.
pub const PREFIX_LEN: u64 = 0x30;

/// Offset of the asset and layer counts inside the PCNT block.
pub const COUNTS_OFFSET: u64 = 0x38;

/// Offset of the PCRT length field.
pub const CREATED_LEN_OFFSET: u64 = 0x50;

/// Bytes between the end of the PCRT payload and the PLAT length field:
/// the whole PMOD block plus the PLAT tag.
pub const PLATFORM_LEN_SKIP: u64 = 16;

/// Offset of the variant signature inside the platform payload.
pub const SIGNATURE_OFFSET: usize = 4;

/// DICT header, ATOC header and the AINF block.
pub const ASSET_DIRECTORY_SKIP: u64 = 0x1C;

/// LTOC header and the LINF block.
pub const LAYER_DIRECTORY_SKIP: u64 = 0x14;

/// Tag and length of a block.
pub const BLOCK_HEADER_LEN: u64 = 8;

/// Length of the LDBG block trailing each layer entry.
pub const LAYER_DEBUG_LEN: u64 = 12;

/// Alignment of the first asset in the packed data section.
pub const STREAM_ALIGNMENT: u32 = 32;

/// Alignment of each asset in the packed data section.
pub const ASSET_ALIGNMENT: u32 = 16;

/// Filler byte for all alignment padding.
pub const FILLER: u8 = 0x33;

/// Padding needed to reach the next `alignment` boundary after `value`.
///
/// Always in `1..=alignment`: a value already on a boundary is padded up to
/// the following one.
///
/// ```
/// use hipdelta_hip::alignment_padding;
///
/// assert_eq!(alignment_padding(4, 16), 12);
/// assert_eq!(alignment_padding(16, 16), 16);
/// assert_eq!(alignment_padding(17, 16), 15);
/// ```
pub const fn alignment_padding(value: u64, alignment: u32) -> u32 {
    let alignment = alignment as u64;
    (alignment - value % alignment) as u32
}

/// The fixed fields at the start of an AHDR payload.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct AssetRecord {
    pub id: U32,
    pub asset_type: U32,
    pub offset: U32,
    pub size: U32,
    pub pad: U32,
    pub flags: U32,
}

/// PCNT payload.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Counts {
    pub asset_count: U32,
    pub layer_count: U32,
    pub reserved: [U32; 3],
}

impl Counts {
    /// Length of the PCNT payload.
    pub const LEN: u32 = 20;

    pub fn new(asset_count: u32, layer_count: u32) -> Self {
        Self {
            asset_count: U32::new(asset_count),
            layer_count: U32::new(layer_count),
            ..Self::default()
        }
    }
}
