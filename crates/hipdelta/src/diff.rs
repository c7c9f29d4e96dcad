//! Asset comparison between two archives.

use std::io::{Read, Seek};

use hipdelta_common::{regions_equal, BinaryReader};
use hipdelta_hip::Asset;

use crate::Result;

/// How a modified-archive asset relates to the original archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// No original asset has this id.
    Added,
    /// Same id, different data length.
    Resized,
    /// Same id and length, different bytes.
    Modified,
    /// Same id, length and bytes.
    Unchanged,
}

impl Change {
    /// Whether the asset belongs in the delta archive.
    pub fn is_included(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Compare one modified-archive asset against the original directory.
///
/// The first original asset with the same id is marked as matched,
/// whatever the outcome of the comparison.
pub fn classify<O, M>(
    asset: &Asset,
    original: &mut [Asset],
    original_src: &mut BinaryReader<O>,
    modified_src: &mut BinaryReader<M>,
) -> Result<Change>
where
    O: Read + Seek,
    M: Read + Seek,
{
    let Some(counterpart) = original.iter_mut().find(|b| b.id == asset.id) else {
        return Ok(Change::Added);
    };
    counterpart.matched = true;

    if counterpart.size != asset.size {
        return Ok(Change::Resized);
    }

    let same = regions_equal(
        original_src,
        u64::from(counterpart.offset),
        modified_src,
        u64::from(asset.offset),
        u64::from(asset.size),
    )?;

    Ok(if same {
        Change::Unchanged
    } else {
        Change::Modified
    })
}

/// Select the modified-archive assets that are new or changed.
///
/// `modified` is consumed in directory order; unchanged assets are dropped.
/// Afterwards, every asset in `original` that is still unmatched has no
/// counterpart in the modified archive.
pub fn select_changed<O, M>(
    original: &mut [Asset],
    modified: Vec<Asset>,
    original_src: &mut BinaryReader<O>,
    modified_src: &mut BinaryReader<M>,
) -> Result<Vec<Asset>>
where
    O: Read + Seek,
    M: Read + Seek,
{
    let mut selected = Vec::new();

    for asset in modified {
        let change = classify(&asset, original, original_src, modified_src)?;
        log::debug!("[{:08x}] {}: {change:?}", asset.id, asset.display_name());

        if change.is_included() {
            selected.push(asset);
        }
    }

    Ok(selected)
}
