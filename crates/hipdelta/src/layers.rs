//! Layer reconstruction.
//!
//! Selected assets are placed into the output layer buckets by walking the
//! modified archive's layer directory, so each keeps the layer it has there.
//! Then the original archive's layer directory is walked, and every original
//! asset left unmatched by the diff gets a placeholder in the layer it used
//! to occupy.

use std::io::{Read, Seek};

use hipdelta_common::BinaryReader;
use hipdelta_hip::{
    alignment_padding, load_data, Asset, Layer, LayerEntry, Variant, ASSET_ALIGNMENT,
};

use crate::error::{Error, Side};
use crate::progress::Progress;
use crate::Result;

/// The assets and layer buckets of an output archive.
#[derive(Debug, Clone)]
pub struct LayerPlan {
    variant: Variant,
    /// Selected assets in modified-directory order, then placeholders.
    assets: Vec<Asset>,
    layers: Vec<Layer>,
    selected: usize,
    placed: Vec<bool>,
}

impl LayerPlan {
    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// All buckets, active or not.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Buckets that will be written, with their slot index.
    pub fn active_layers(&self) -> impl Iterator<Item = (usize, &Layer)> + '_ {
        self.layers.iter().enumerate().filter(|(_, l)| l.is_active())
    }

    /// Number of directory entries the output will have.
    pub fn placements(&self) -> usize {
        self.active_layers().map(|(_, l)| l.len()).sum()
    }

    /// Placeholder assets created for removed originals.
    pub fn dummies(&self) -> &[Asset] {
        &self.assets[self.selected..]
    }

    /// Selected assets that no modified layer references.
    pub fn unplaced(&self) -> impl Iterator<Item = &Asset> + '_ {
        self.assets[..self.selected]
            .iter()
            .zip(&self.placed)
            .filter(|(_, placed)| !**placed)
            .map(|(a, _)| a)
    }

    /// Output assets in write order: bucket by bucket, members in order.
    pub fn ordered(&self) -> impl Iterator<Item = &Asset> + '_ {
        self.active_layers()
            .flat_map(|(_, l)| l.members.iter())
            .map(move |&index| &self.assets[index])
    }

    /// Load the data of every placed asset from the modified archive.
    ///
    /// Placeholders already carry their data.
    pub fn load_data<R: Read + Seek>(&mut self, source: &mut BinaryReader<R>) -> Result<()> {
        for index in 0..self.selected {
            if self.placed[index] && self.assets[index].data.is_none() {
                load_data(source, &mut self.assets[index]).map_err(Error::input(Side::Modified))?;
            }
        }
        Ok(())
    }

    /// Hand the plan over to the writer.
    pub fn into_parts(self) -> (Vec<Asset>, Vec<Layer>) {
        (self.assets, self.layers)
    }

    fn place(&mut self, slot: usize, index: usize) {
        let asset = &mut self.assets[index];
        asset.pad = alignment_padding(u64::from(asset.size), ASSET_ALIGNMENT);
        let padded = asset.padded_size();
        self.layers[slot].push(index, padded);
    }
}

/// Bucket for a layer code; codes the variant does not know go to bucket 0.
fn slot_for(variant: Variant, code: u32) -> usize {
    variant.slot_for(code).unwrap_or_else(|| {
        log::warn!("layer type {code} unknown to the {variant} variant, using layer 0");
        0
    })
}

/// Build the output layer plan.
///
/// `selected` are the new and changed assets from the modified archive;
/// `original` is the original directory with `matched` set by the diff.
pub fn reconstruct(
    variant: Variant,
    selected: Vec<Asset>,
    original: &[Asset],
    modified_layers: &[LayerEntry],
    original_layers: &[LayerEntry],
    progress: &mut dyn FnMut(Progress<'_>),
) -> LayerPlan {
    let count = selected.len();
    let mut plan = LayerPlan {
        variant,
        assets: selected,
        layers: Layer::buckets(variant),
        selected: count,
        placed: vec![false; count],
    };

    progress(Progress::Selecting);
    for entry in modified_layers {
        let slot = slot_for(variant, entry.type_code);
        for &id in &entry.members {
            let Some(index) = plan.assets[..count].iter().position(|a| a.id == id) else {
                continue;
            };
            plan.place(slot, index);
            plan.placed[index] = true;

            let name = plan.assets[index].display_name();
            progress(Progress::Included {
                layer: slot,
                id,
                name: &name,
            });
        }
    }

    progress(Progress::Dummying);
    for entry in original_layers {
        let slot = slot_for(variant, entry.type_code);
        for &id in &entry.members {
            let Some(removed) = original.iter().find(|a| a.id == id) else {
                continue;
            };
            if removed.matched {
                continue;
            }

            plan.assets.push(Asset::dummy(id));
            plan.place(slot, plan.assets.len() - 1);

            progress(Progress::Dummied {
                id,
                name: &removed.display_name(),
            });
        }
    }

    for asset in plan.unplaced() {
        log::warn!(
            "asset [{:08x}] {} is in no layer of the modified archive, leaving it out",
            asset.id,
            asset.display_name()
        );
    }

    plan
}
