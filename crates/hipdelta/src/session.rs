//! Delta building session.
//!
//! A [`DeltaSession`] owns the two input streams for the whole run and
//! threads them through reading, diffing, layer reconstruction and writing.

use std::io::{Read, Seek, Write};

use hipdelta_common::BinaryReader;
use hipdelta_hip::{HipArchive, HipWriter, Platform, Timestamp, Variant, WriteSummary};

use crate::diff::select_changed;
use crate::error::{Error, Side};
use crate::layers::{reconstruct, LayerPlan};
use crate::progress::Progress;
use crate::Result;

/// Options for building a delta archive.
#[derive(Debug, Clone, Default)]
pub struct DeltaOptions {
    /// Time stamped into the output; the current local time if unset.
    pub timestamp: Option<Timestamp>,
}

impl DeltaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the output with a fixed time.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A planned delta archive, ready to be written.
#[derive(Debug, Clone)]
pub struct Delta {
    original_assets: u32,
    modified_assets: u32,
    platform: Platform,
    plan: LayerPlan,
}

impl Delta {
    /// Asset count declared by the original archive.
    pub fn original_assets(&self) -> u32 {
        self.original_assets
    }

    /// Asset count declared by the modified archive.
    pub fn modified_assets(&self) -> u32 {
        self.modified_assets
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn plan(&self) -> &LayerPlan {
        &self.plan
    }

    /// Whether the output would contain no assets at all.
    pub fn is_empty(&self) -> bool {
        self.plan.placements() == 0
    }
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaSummary {
    pub original_assets: u32,
    pub modified_assets: u32,
    pub variant: Variant,
    /// New and changed assets written.
    pub real_assets: usize,
    /// Placeholders written for removed assets.
    pub dummy_assets: usize,
    /// New and changed assets left out for lack of a layer.
    pub unplaced_assets: usize,
    pub written: WriteSummary,
}

/// Builds a delta archive from an original and a modified archive.
///
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
///
/// use hipdelta::DeltaSession;
///
/// let original = BufReader::new(File::open("hb01.hip")?);
/// let modified = BufReader::new(File::open("hb01_mod.hip")?);
/// let output = File::create("output.hip")?;
///
/// let mut session = DeltaSession::new(original, modified);
/// let summary = session.write_to(output, &mut |event| println!("{event}"))?;
/// println!("{} layer(s)", summary.written.layer_count);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DeltaSession<O, M> {
    original: BinaryReader<O>,
    modified: BinaryReader<M>,
    options: DeltaOptions,
}

impl<O: Read + Seek, M: Read + Seek> DeltaSession<O, M> {
    pub fn new(original: O, modified: M) -> Self {
        Self {
            original: BinaryReader::new(original),
            modified: BinaryReader::new(modified),
            options: DeltaOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DeltaOptions) -> Self {
        self.options = options;
        self
    }

    /// Read and compare both archives and lay out the output.
    ///
    /// Nothing is written; the returned [`Delta`] is handed to
    /// [`write`](Self::write).
    pub fn plan(&mut self, progress: &mut dyn FnMut(Progress<'_>)) -> Result<Delta> {
        let mut original =
            HipArchive::read(&mut self.original).map_err(Error::input(Side::Original))?;
        let mut modified =
            HipArchive::read(&mut self.modified).map_err(Error::input(Side::Modified))?;

        progress(Progress::Loaded {
            original: original.asset_count(),
            modified: modified.asset_count(),
        });

        let (ours, theirs) = (original.platform(), modified.platform());
        if ours.len() != theirs.len() {
            return Err(Error::PlatformMismatch {
                original_len: ours.len(),
                modified_len: theirs.len(),
            });
        }
        if let Some(offset) = ours.first_difference(theirs) {
            return Err(Error::PlatformContentMismatch { offset });
        }

        let variant = modified.platform().variant();
        log::debug!("using the {variant} layer table");

        let candidates = modified.take_assets();
        let selected = select_changed(
            original.assets_mut(),
            candidates,
            &mut self.original,
            &mut self.modified,
        )?;
        log::debug!("{} new or changed asset(s)", selected.len());

        let mut plan = reconstruct(
            variant,
            selected,
            original.assets(),
            modified.layers(),
            original.layers(),
            progress,
        );
        plan.load_data(&mut self.modified)?;

        Ok(Delta {
            original_assets: original.asset_count(),
            modified_assets: modified.asset_count(),
            platform: modified.platform().clone(),
            plan,
        })
    }

    /// Write a planned delta archive to `output`.
    pub fn write<W: Write + Seek>(&mut self, delta: Delta, output: W) -> Result<DeltaSummary> {
        let timestamp = self.options.timestamp.clone().unwrap_or_else(Timestamp::now);

        let variant = delta.plan.variant();
        let dummy_assets = delta.plan.dummies().len();
        let unplaced_assets = delta.plan.unplaced().count();
        let real_assets = delta.plan.placements() - dummy_assets;

        let (assets, layers) = delta.plan.into_parts();
        let mut writer = HipWriter::new(output);
        let written = writer.write(
            &mut self.modified,
            &delta.platform,
            &assets,
            &layers,
            &timestamp,
        )?;

        Ok(DeltaSummary {
            original_assets: delta.original_assets,
            modified_assets: delta.modified_assets,
            variant,
            real_assets,
            dummy_assets,
            unplaced_assets,
            written,
        })
    }

    /// Plan and write in one go.
    pub fn write_to<W: Write + Seek>(
        &mut self,
        output: W,
        progress: &mut dyn FnMut(Progress<'_>),
    ) -> Result<DeltaSummary> {
        let delta = self.plan(progress)?;
        self.write(delta, output)
    }
}
