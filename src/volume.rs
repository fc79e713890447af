//! Loading label volumes from disk.
//!
//! Supports NIfTI-1 (`.nii`, `.nii.gz`) through the `nifti` crate and
//! FreeSurfer MGH (`.mgh`, `.mgz`). Every datatype is converted to `f64`.

use flate2::read::GzDecoder;
use ndarray::{Array3, ArrayD, Axis, Ix3, ShapeBuilder};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::common::Volume;
use crate::error::{Error, Result};

/// Byte offset of the voxel data in an MGH file.
const MGH_HEADER_SIZE: usize = 284;

/// Fixed fields at the start of an MGH header (all big-endian).
#[derive(Debug, Clone, PartialEq)]
struct MghHeader {
    dims: [usize; 3],
    frames: usize,
    dtype: MghType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MghType {
    UChar,
    Int,
    Float,
    Short,
}

impl MghType {
    fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(MghType::UChar),
            1 => Some(MghType::Int),
            3 => Some(MghType::Float),
            4 => Some(MghType::Short),
            _ => None,
        }
    }

    fn size(&self) -> usize {
        match self {
            MghType::UChar => 1,
            MghType::Short => 2,
            MghType::Int | MghType::Float => 4,
        }
    }

    fn decode(&self, bytes: &[u8]) -> f64 {
        match self {
            MghType::UChar => bytes[0] as f64,
            MghType::Short => i16::from_be_bytes([bytes[0], bytes[1]]) as f64,
            MghType::Int => i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            MghType::Float => f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VolumeKind {
    Nifti,
    Mgh { gzipped: bool },
}

fn volume_kind(path: &Path) -> Option<VolumeKind> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".nii") || name.ends_with(".nii.gz") {
        Some(VolumeKind::Nifti)
    } else if name.ends_with(".mgz") || name.ends_with(".mgh.gz") {
        Some(VolumeKind::Mgh { gzipped: true })
    } else if name.ends_with(".mgh") {
        Some(VolumeKind::Mgh { gzipped: false })
    } else {
        None
    }
}

/// Reads a 3D volume, choosing the decoder from the file name.
pub fn load(path: impl AsRef<Path>) -> Result<Volume> {
    let path = path.as_ref();
    let img = match volume_kind(path) {
        Some(VolumeKind::Nifti) => load_nifti(path)?,
        Some(VolumeKind::Mgh { gzipped }) => load_mgh(path, gzipped)?,
        None => {
            return Err(Error::load(
                path,
                "unrecognized file type (expected .mgz, .mgh, .nii or .nii.gz)",
            ))
        }
    };
    let img = into_3d(img).map_err(|reason| Error::load(path, reason))?;
    log::info!("loaded {} with shape {:?}", path.display(), img.dim());
    Ok(Volume::new(img))
}

fn load_nifti(path: &Path) -> Result<ArrayD<f64>> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .map_err(|e| Error::load(path, e))?;
    obj.into_volume()
        .into_ndarray::<f64>()
        .map_err(|e| Error::load(path, e))
}

fn load_mgh(path: &Path, gzipped: bool) -> Result<ArrayD<f64>> {
    let file = File::open(path).map_err(|e| Error::load(path, e))?;
    let mut bytes = Vec::new();
    let read = if gzipped {
        GzDecoder::new(BufReader::new(file)).read_to_end(&mut bytes)
    } else {
        BufReader::new(file).read_to_end(&mut bytes)
    };
    read.map_err(|e| Error::load(path, e))?;
    parse_mgh(&bytes).map_err(|reason| Error::load(path, reason))
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn parse_mgh_header(bytes: &[u8]) -> std::result::Result<MghHeader, String> {
    if bytes.len() < MGH_HEADER_SIZE {
        return Err(format!("MGH header truncated ({} bytes)", bytes.len()));
    }
    let version = read_i32(bytes, 0);
    if version != 1 {
        return Err(format!("unsupported MGH version {version}"));
    }
    let mut fields = [0usize; 4];
    for (i, field) in fields.iter_mut().enumerate() {
        let v = read_i32(bytes, 4 + 4 * i);
        *field = usize::try_from(v).map_err(|_| format!("negative MGH dimension {v}"))?;
    }
    let code = read_i32(bytes, 20);
    let dtype =
        MghType::from_code(code).ok_or_else(|| format!("unsupported MGH data type {code}"))?;
    Ok(MghHeader {
        dims: [fields[0], fields[1], fields[2]],
        frames: fields[3],
        dtype,
    })
}

/// Decodes an uncompressed MGH byte stream into an (x, y, z, frame) array.
fn parse_mgh(bytes: &[u8]) -> std::result::Result<ArrayD<f64>, String> {
    let header = parse_mgh_header(bytes)?;
    let [x, y, z] = header.dims;
    let size = header.dtype.size();
    let overflow = || format!("MGH dimensions {x}x{y}x{z}x{} are too large", header.frames);
    let count = [y, z, header.frames]
        .iter()
        .try_fold(x, |acc, &d| acc.checked_mul(d))
        .ok_or_else(overflow)?;
    let end = count
        .checked_mul(size)
        .and_then(|n| n.checked_add(MGH_HEADER_SIZE))
        .ok_or_else(overflow)?;
    if bytes.len() < end {
        return Err(format!(
            "MGH data truncated: expected {} voxels, file holds {} bytes of data",
            count,
            bytes.len() - MGH_HEADER_SIZE
        ));
    }
    let values: Vec<f64> = bytes[MGH_HEADER_SIZE..end]
        .chunks_exact(size)
        .map(|b| header.dtype.decode(b))
        .collect();
    // MGH stores x fastest, i.e. column-major
    ArrayD::from_shape_vec(vec![x, y, z, header.frames].f(), values).map_err(|e| e.to_string())
}

/// Drops trailing singleton axes (e.g. a single frame) and enforces 3D.
fn into_3d(mut img: ArrayD<f64>) -> std::result::Result<Array3<f64>, String> {
    while img.ndim() > 3 && img.shape()[img.ndim() - 1] == 1 {
        let last = Axis(img.ndim() - 1);
        img = img.index_axis_move(last, 0);
    }
    if img.ndim() != 3 {
        return Err(format!(
            "volume must be 3D, got shape {:?}. Tip: split 4D volumes into single frames first.",
            img.shape()
        ));
    }
    img.into_dimensionality::<Ix3>().map_err(|e| e.to_string())
}
