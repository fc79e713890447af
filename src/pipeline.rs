//! One conversion run: load, discover labels, prepare directories, write slices.

use std::path::PathBuf;

use crate::common::{Label, Volume};
use crate::config::Config;
use crate::error::Result;
use crate::layout::OutputLayout;
use crate::partition;
use crate::raster;

/// What was written for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOutput {
    pub label: Label,
    pub dir: PathBuf,
    pub slices: usize,
}

/// Loads `config.input_file` and converts it.
///
/// The configuration is validated before the volume is read.
pub fn run(config: &Config) -> Result<Vec<LabelOutput>> {
    config.validate()?;
    let volume = crate::volume::load(&config.input_file)?;
    convert(&volume, config)
}

/// Converts an already loaded volume into per-label image stacks.
///
/// Every label directory is checked and created before the first image is
/// written, so a collision never leaves half a run behind. Labels are masked
/// one at a time.
///
/// # Arguments
///
/// * `volume` - The labeled volume to split.
/// * `config` - Output root, file stem, image format and normalization.
///
/// # Returns
///
/// One `LabelOutput` per distinct voxel value, in ascending label order.
pub fn convert(volume: &Volume, config: &Config) -> Result<Vec<LabelOutput>> {
    config.validate()?;
    let labels = partition::labels(volume)?;
    log::info!(
        "{} labels: {}",
        labels.len(),
        labels
            .iter()
            .map(|l| l.dir_name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let layout = OutputLayout::new(&config.output_dir);
    layout.prepare(&labels)?;

    let mut outputs = Vec::with_capacity(labels.len());
    for label in labels {
        let masked = partition::mask(volume, label);
        let slices = raster::rasterize(
            &masked,
            &layout,
            &config.output_stem,
            config.format,
            config.normalize,
        )?;
        log::info!("label {label}: wrote {slices} slices");
        outputs.push(LabelOutput {
            label,
            dir: layout.label_dir(label),
            slices,
        });
    }
    Ok(outputs)
}
