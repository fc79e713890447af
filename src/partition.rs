//! Splitting a volume into one masked volume per distinct voxel value.

use ordered_float::OrderedFloat;
use std::collections::BTreeSet;

use crate::common::{Label, MaskedVolume, Volume};
use crate::error::{Error, Result};

/// Discovers every distinct voxel value, in ascending order.
///
/// Fails on an empty volume and on non-finite voxels, which have no integer name.
pub fn labels(volume: &Volume) -> Result<Vec<Label>> {
    if volume.is_empty() {
        return Err(Error::EmptyVolume);
    }
    let mut unique = BTreeSet::new();
    for &v in volume.data().iter() {
        if !v.is_finite() {
            return Err(Error::InvalidLabel(v));
        }
        // -0.0 and 0.0 are the same label
        unique.insert(OrderedFloat(if v == 0.0 { 0.0 } else { v }));
    }
    log::debug!("found {} distinct labels", unique.len());
    Ok(unique.into_iter().map(|v| Label::new(v.0)).collect())
}

/// Builds a new array of the volume's shape holding `label` where the source
/// equals it and 0 elsewhere.
pub fn mask(volume: &Volume, label: Label) -> MaskedVolume {
    let value = label.value();
    let data = volume
        .data()
        .mapv(|v| if v == value { value } else { 0.0 });
    MaskedVolume::new(label, data)
}

/// Materializes every masked volume at once.
///
/// The pipeline masks labels one at a time instead; this is for callers that
/// want the whole partition.
pub fn partition(volume: &Volume) -> Result<Vec<MaskedVolume>> {
    Ok(labels(volume)?
        .into_iter()
        .map(|label| mask(volume, label))
        .collect())
}
