#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{Array2, Array3};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `data`, indexed (x, y, z), as a gzipped int16 MGH volume.
pub fn write_mgz(path: &Path, data: &Array3<i16>) {
    let (x, y, z) = data.dim();
    let mut bytes = Vec::new();
    for v in [1, x as i32, y as i32, z as i32, 1, 4, 0] {
        bytes.extend_from_slice(&v.to_be_bytes());
    }
    bytes.resize(284, 0);
    for k in 0..z {
        for j in 0..y {
            for i in 0..x {
                bytes.extend_from_slice(&data[[i, j, k]].to_be_bytes());
            }
        }
    }
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(&bytes).unwrap();
    enc.finish().unwrap();
}

/// Decodes a grayscale image into (rows, columns) of 16-bit values.
pub fn read_png(path: &Path) -> Array2<u16> {
    let img = image::open(path).unwrap().into_luma16();
    let (w, h) = img.dimensions();
    Array2::from_shape_vec((h as usize, w as usize), img.into_raw()).unwrap()
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
