//! Writing masked volumes out as stacks of grayscale images.
//!
//! PNG slices are 16-bit so raw label values up to 65535 survive exactly.
//! JPEG is lossy, so it is only written for normalized (visual) output.

use image::{ImageBuffer, Luma};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::common::{MaskedVolume, Slice2D, Voxel};
use crate::error::{Error, Result};
use crate::layout::OutputLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Largest pixel value at this format's bit depth.
    pub fn max_value(&self) -> u16 {
        match self {
            OutputFormat::Png => u16::MAX,
            OutputFormat::Jpeg => u8::MAX as u16,
        }
    }

    /// Whether pixel values written in this format decode back unchanged.
    pub fn is_lossless(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }

    /// Fails unless raw label values can be written in this format.
    pub fn check_raw(&self, normalize: bool) -> Result<()> {
        if normalize || self.is_lossless() {
            Ok(())
        } else {
            Err(Error::LossyFormat(*self))
        }
    }

    /// Recognizes a file extension, without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ext = s.strip_prefix('.').unwrap_or(s);
        Self::from_extension(ext).ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How voxel values become pixel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantizer {
    /// Natural magnitude; values must be integral and fit the bit depth.
    Raw { max_value: u16 },
    /// Linear map of `[min, max]` onto `[0, max_value]`.
    MinMax { min: Voxel, max: Voxel, max_value: u16 },
}

impl Quantizer {
    /// Picks the quantizer for one label volume. Normalization is computed
    /// over the whole masked volume so every slice of a stack shares one scale.
    pub fn for_volume(masked: &MaskedVolume, format: OutputFormat, normalize: bool) -> Self {
        let max_value = format.max_value();
        if normalize {
            let (min, max) = masked.value_range();
            Quantizer::MinMax { min, max, max_value }
        } else {
            Quantizer::Raw { max_value }
        }
    }

    pub fn quantize(&self, v: Voxel) -> std::result::Result<u16, String> {
        match *self {
            Quantizer::Raw { max_value } => {
                if v.fract() != 0.0 || v < 0.0 || v > max_value as Voxel {
                    return Err(format!(
                        "value {v} is not an integer in 0..={max_value}; use normalization for this label"
                    ));
                }
                Ok(v as u16)
            }
            Quantizer::MinMax { min, max, max_value } => {
                if max <= min {
                    return Ok(0);
                }
                let scaled = (v - min) / (max - min) * max_value as Voxel;
                Ok(scaled.round().clamp(0.0, max_value as Voxel) as u16)
            }
        }
    }
}

/// Quantizes one slice into a row-major pixel buffer (rows follow the second volume axis).
pub fn quantize_slice(
    slice: &Slice2D<'_>,
    quantizer: &Quantizer,
) -> std::result::Result<Vec<u16>, String> {
    slice.slice.iter().map(|&v| quantizer.quantize(v)).collect()
}

fn encode(
    pixels: Vec<u16>,
    width: u32,
    height: u32,
    format: OutputFormat,
    path: &Path,
) -> std::result::Result<(), String> {
    match format {
        OutputFormat::Png => {
            let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
                ImageBuffer::from_raw(width, height, pixels)
                    .ok_or("pixel buffer does not match slice shape")?;
            buf.save_with_format(path, image::ImageFormat::Png)
                .map_err(|e| e.to_string())
        }
        OutputFormat::Jpeg => {
            // the quantizer's max_value bounds every value by 255
            let bytes = pixels.into_iter().map(|p| p as u8).collect();
            let buf: ImageBuffer<Luma<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, bytes)
                    .ok_or("pixel buffer does not match slice shape")?;
            buf.save_with_format(path, image::ImageFormat::Jpeg)
                .map_err(|e| e.to_string())
        }
    }
}

/// Writes a masked label volume out as one image per slice along the first axis.
///
/// Slices are written in increasing index order to
/// `<root>/<label>/<stem>-<index>.<ext>`, empty slices included, so the label
/// directory always holds a complete, index-addressable stack. Without
/// normalization the raw label values are written and must decode back
/// exactly, which only PNG guarantees; asking for raw JPEG output fails before
/// any file is written.
///
/// # Arguments
///
/// * `masked` - The masked volume of one label.
/// * `layout` - The output tree; the label's directory must already exist.
/// * `stem` - The file stem shared by every slice image.
/// * `format` - The image format to encode.
/// * `normalize` - Rescale the label volume's range onto the full pixel range.
///
/// # Returns
///
/// The number of images written, equal to the first-axis extent of `masked`.
/// The first slice that cannot be quantized or encoded aborts the label with
/// `Error::Encode`; images already written are left in place.
pub fn rasterize(
    masked: &MaskedVolume,
    layout: &OutputLayout,
    stem: &str,
    format: OutputFormat,
    normalize: bool,
) -> Result<usize> {
    format.check_raw(normalize)?;
    let label = masked.label;
    let quantizer = Quantizer::for_volume(masked, format, normalize);
    let (_, height, width) = masked.data.dim();
    let mut written = 0;
    for s in masked.slices() {
        let path = layout.slice_path(label, stem, s.index, format.extension());
        let encode_error = |reason: String| Error::Encode {
            label: label.as_int(),
            index: s.index,
            path: path.clone(),
            reason,
        };
        let pixels = quantize_slice(&s, &quantizer).map_err(encode_error)?;
        encode(pixels, width as u32, height as u32, format, &path).map_err(encode_error)?;
        log::debug!("wrote {}", path.display());
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Label;
    use ndarray::Array3;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!(".jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert!(matches!(
            "bmp".parse::<OutputFormat>(),
            Err(Error::UnsupportedFormat(f)) if f == "bmp"
        ));
    }

    #[test]
    fn raw_quantization_is_exact_or_fails() {
        let q = Quantizer::Raw { max_value: u16::MAX };
        assert_eq!(q.quantize(0.0), Ok(0));
        assert_eq!(q.quantize(65535.0), Ok(65535));
        assert!(q.quantize(65536.0).is_err());
        assert!(q.quantize(-1.0).is_err());
        assert!(q.quantize(2.5).is_err());

        let jpeg = Quantizer::Raw { max_value: 255 };
        assert_eq!(jpeg.quantize(255.0), Ok(255));
        assert!(jpeg.quantize(256.0).is_err());
    }

    #[test]
    fn min_max_spans_full_range() {
        let q = Quantizer::MinMax {
            min: 0.0,
            max: 41.0,
            max_value: 255,
        };
        assert_eq!(q.quantize(0.0), Ok(0));
        assert_eq!(q.quantize(41.0), Ok(255));

        let flat = Quantizer::MinMax {
            min: 0.0,
            max: 0.0,
            max_value: 255,
        };
        assert_eq!(flat.quantize(0.0), Ok(0));
    }

    #[test]
    fn normalization_uses_whole_volume_range() {
        // slice 0 is empty, slice 1 holds the label: both share one scale
        let mut data = Array3::zeros((2, 2, 2));
        data[[1, 0, 0]] = 300.0;
        let masked = MaskedVolume::new(Label::new(300.0), data);
        let q = Quantizer::for_volume(&masked, OutputFormat::Jpeg, true);
        assert_eq!(
            q,
            Quantizer::MinMax {
                min: 0.0,
                max: 300.0,
                max_value: 255
            }
        );
        let slices: Vec<_> = masked.slices().collect();
        assert_eq!(quantize_slice(&slices[0], &q).unwrap(), vec![0; 4]);
        assert_eq!(quantize_slice(&slices[1], &q).unwrap(), vec![255, 0, 0, 0]);
    }

    #[test]
    fn raw_jpeg_is_refused_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let label = Label::new(5.0);
        layout.prepare(&[label]).unwrap();
        let masked = MaskedVolume::new(label, Array3::from_elem((2, 4, 4), 5.0));

        let err = rasterize(&masked, &layout, "sample", OutputFormat::Jpeg, false).unwrap_err();
        assert!(matches!(err, Error::LossyFormat(OutputFormat::Jpeg)));
        assert!(std::fs::read_dir(layout.label_dir(label)).unwrap().next().is_none());

        // normalized previews are fine as JPEG
        assert_eq!(
            rasterize(&masked, &layout, "sample", OutputFormat::Jpeg, true).unwrap(),
            2
        );
    }

    #[test]
    fn oversized_raw_label_aborts_png() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let label = Label::new(70000.0);
        layout.prepare(&[label]).unwrap();
        let masked = MaskedVolume::new(label, Array3::from_elem((3, 2, 2), 70000.0));

        let err = rasterize(&masked, &layout, "sample", OutputFormat::Png, false).unwrap_err();
        match err {
            Error::Encode { label, index, .. } => {
                assert_eq!(label, 70000);
                assert_eq!(index, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!layout.slice_path(label, "sample", 1, "png").exists());
    }
}
