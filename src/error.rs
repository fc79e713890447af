//! Error types for label slicing.

use std::path::PathBuf;
use thiserror::Error;

/// Every way a conversion run can fail.
#[derive(Error, Debug)]
pub enum Error {
    /// The input volume could not be read or decoded.
    #[error("could not load volume `{path}`: {reason}")]
    VolumeLoad { path: PathBuf, reason: String },

    #[error("volume has no voxels")]
    EmptyVolume,

    /// A label directory is already present under the output root.
    #[error("output directory `{0}` already exists (the output root must be fresh)")]
    DirectoryExists(PathBuf),

    #[error("unsupported output image format `{0}` (expected png or jpg)")]
    UnsupportedFormat(String),

    /// Raw label values were requested in a format that cannot store them exactly.
    #[error("raw label values cannot be stored losslessly as {0}; write png or enable normalization")]
    LossyFormat(crate::raster::OutputFormat),

    /// A single slice could not be quantized or written.
    #[error("label {label}: could not write slice {index} to `{path}`: {reason}")]
    Encode {
        label: i64,
        index: usize,
        path: PathBuf,
        reason: String,
    },

    #[error("voxel value {0} cannot be used as a label")]
    InvalidLabel(f64),

    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A slice stack on disk is missing images or has mismatched shapes.
    #[error("invalid slice stack in `{path}`: {reason}")]
    Stack { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::VolumeLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Specialized Result type for label slicing
pub type Result<T> = std::result::Result<T, Error>;
