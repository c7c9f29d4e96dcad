//! Layers and engine variants.
//!
//! A layer groups assets that the engine loads together. On disk every
//! layer carries a type code; which codes exist, and the order buckets are
//! written in, depends on the engine variant. Two variants are known:
//!
//! | Variant | Slots | Codes by slot |
//! |---|---|---|
//! | [`Variant::Legacy`] | 9 | 1, 2, 10, 3, 4, 0, 8, 6, 7 |
//! | [`Variant::Standard`] | 11 | 1, 2, 3, 11, 4, 5, 0, 9, 7, 8, 10 |
//!
//! Output archives always have [`LAYER_SLOTS`] buckets. Slots past the end
//! of a variant's table have no code and are never written.

use std::fmt;

use crate::format::SIGNATURE_OFFSET;

/// Number of layer buckets in an output archive.
pub const LAYER_SLOTS: usize = 12;

const LEGACY_CODES: [u32; 9] = [1, 2, 10, 3, 4, 0, 8, 6, 7];
const STANDARD_CODES: [u32; 11] = [1, 2, 3, 11, 4, 5, 0, 9, 7, 8, 10];

/// Engine configuration, detected from the platform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// 11-slot layout.
    #[default]
    Standard,
    /// 9-slot layout, identified by the `Ga` platform signature.
    Legacy,
}

impl Variant {
    /// Platform signature selecting [`Variant::Legacy`].
    pub const LEGACY_SIGNATURE: [u8; 2] = *b"Ga";

    /// Pick the variant from a platform block payload.
    pub fn from_platform(platform: &[u8]) -> Self {
        match platform.get(SIGNATURE_OFFSET..SIGNATURE_OFFSET + 2) {
            Some(sig) if sig == Self::LEGACY_SIGNATURE => Self::Legacy,
            _ => Self::Standard,
        }
    }

    /// Layer type codes in slot order.
    pub const fn codes(self) -> &'static [u32] {
        match self {
            Self::Standard => &STANDARD_CODES,
            Self::Legacy => &LEGACY_CODES,
        }
    }

    /// Bucket index for an on-disk layer type code.
    pub fn slot_for(self, code: u32) -> Option<usize> {
        self.codes().iter().position(|&c| c == code)
    }

    /// On-disk layer type code for a bucket, if the variant has one.
    pub fn code_for(self, slot: usize) -> Option<u32> {
        self.codes().get(slot).copied()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// One LHDR entry of an archive's layer directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    pub type_code: u32,
    /// Member asset ids in directory order.
    pub members: Vec<u32>,
}

/// An output layer bucket.
///
/// Members are indices into the asset list the layer is written with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    /// On-disk type code, or `None` for a slot the variant does not use.
    pub type_code: Option<u32>,
    pub members: Vec<usize>,
    /// Sum of `size + pad` over all members.
    pub total_size: u64,
}

impl Layer {
    pub fn new(type_code: Option<u32>) -> Self {
        Self {
            type_code,
            ..Self::default()
        }
    }

    /// Create all buckets for a variant.
    pub fn buckets(variant: Variant) -> Vec<Self> {
        (0..LAYER_SLOTS)
            .map(|slot| Self::new(variant.code_for(slot)))
            .collect()
    }

    /// Append a member whose size and padding are already known.
    pub fn push(&mut self, index: usize, padded_size: u64) {
        self.members.push(index);
        self.total_size += padded_size;
    }

    /// Whether the layer will be written.
    pub fn is_active(&self) -> bool {
        self.type_code.is_some() && !self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
