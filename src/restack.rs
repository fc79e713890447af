//! Reading a label directory's slice images back into a volume.
//!
//! Slices are ordered by the numeric index in their file names, so
//! `sample-10` follows `sample-9`.

use glob::{glob, Pattern};
use ndarray::{Array2, Array3, Axis};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::raster::OutputFormat;

/// Parses the index out of `<stem>-<index>.<ext>`.
pub fn slice_index(path: &Path, stem: &str) -> Option<usize> {
    let name = path.file_stem()?.to_str()?;
    name.strip_prefix(stem)?.strip_prefix('-')?.parse().ok()
}

/// Finds `<stem>-*.<ext>` in `dir`, sorted by index, and checks there are no gaps.
pub fn find_slices(dir: &Path, stem: &str, ext: &str) -> Result<Vec<PathBuf>> {
    let stack_error = |reason: String| Error::Stack {
        path: dir.to_path_buf(),
        reason,
    };
    let dir_str = dir
        .to_str()
        .ok_or_else(|| stack_error("path is not valid UTF-8".to_string()))?;
    let pattern = format!(
        "{}/{}-*.{}",
        Pattern::escape(dir_str),
        Pattern::escape(stem),
        ext
    );
    let entries = glob(&pattern).map_err(|e| stack_error(e.to_string()))?;

    let mut indexed: Vec<(usize, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|path| slice_index(&path, stem).map(|i| (i, path)))
        .collect();
    indexed.sort_by_key(|(i, _)| *i);

    if indexed.is_empty() {
        return Err(stack_error(format!("no `{stem}-<index>.{ext}` images found")));
    }
    for (expected, (index, path)) in indexed.iter().enumerate() {
        if *index != expected {
            return Err(stack_error(format!(
                "expected slice {expected}, found `{}`",
                path.display()
            )));
        }
    }
    Ok(indexed.into_iter().map(|(_, p)| p).collect())
}

/// Reads one grayscale slice as (rows, columns).
pub fn read_slice(path: &Path) -> Result<Array2<u16>> {
    let stack_error = |reason: String| Error::Stack {
        path: path.to_path_buf(),
        reason,
    };
    let img = image::open(path)
        .map_err(|e| stack_error(e.to_string()))?
        .into_luma16();
    let (width, height) = img.dimensions();
    Array2::from_shape_vec((height as usize, width as usize), img.into_raw())
        .map_err(|e| stack_error(e.to_string()))
}

/// Stacks the slices of one label directory back into a 3D array.
///
/// The function finds every `<stem>-<index>.<ext>` image in `dir`, orders
/// them by index, checks that no index is missing and that every slice has
/// the same shape, then stacks them along the first axis. This is the inverse
/// of raw (non-normalized) rasterization, so only lossless stacks are accepted.
///
/// # Arguments
///
/// * `dir` - The label directory holding the slice images.
/// * `stem` - The file stem the slices were written with.
/// * `format` - The image format of the slices; must be lossless.
///
/// # Returns
///
/// An `Array3<u16>` of shape (slices, rows, columns) holding the decoded
/// pixel values, or `Error::LossyFormat` for JPEG stacks and `Error::Stack`
/// for missing, unreadable or mismatched slices.
pub fn restack(dir: &Path, stem: &str, format: OutputFormat) -> Result<Array3<u16>> {
    if !format.is_lossless() {
        return Err(Error::LossyFormat(format));
    }
    let paths = find_slices(dir, stem, format.extension())?;
    let mut planes: Vec<Array2<u16>> = Vec::with_capacity(paths.len());
    for path in &paths {
        let plane = read_slice(path)?;
        if let Some(first) = planes.first() {
            if first.dim() != plane.dim() {
                return Err(Error::Stack {
                    path: path.clone(),
                    reason: format!("shape {:?} differs from {:?}", plane.dim(), first.dim()),
                });
            }
        }
        log::debug!("read {}", path.display());
        planes.push(plane);
    }
    let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
    ndarray::stack(Axis(0), &views).map_err(|e| Error::Stack {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}
