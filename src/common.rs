use ndarray::{Array3, ArrayView2, Axis};
use std::fmt;

/// Voxels are always handled as `f64`; loaders convert on-disk datatypes at the boundary.
pub type Voxel = f64;

/// The decoded input volume, shape (X, Y, Z).
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<Voxel>,
}

impl Volume {
    pub fn new(data: Array3<Voxel>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Array3<Voxel> {
        &self.data
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A distinct voxel value in a volume.
///
/// Labels are compared by their exact value, but name directories and files by
/// their integer-truncated form, so `2.0` and `2.7` both map to `2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    value: Voxel,
}

impl Label {
    pub fn new(value: Voxel) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Voxel {
        self.value
    }

    /// Integer form used for naming, truncated toward zero.
    pub fn as_int(&self) -> i64 {
        self.value.trunc() as i64
    }

    pub fn dir_name(&self) -> String {
        self.as_int().to_string()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A volume where every voxel not equal to `label` has been set to 0.
#[derive(Debug, Clone)]
pub struct MaskedVolume {
    pub label: Label,
    pub data: Array3<Voxel>,
}

impl MaskedVolume {
    pub fn new(label: Label, data: Array3<Voxel>) -> Self {
        Self { label, data }
    }

    /// Number of slices along the first axis.
    pub fn num_slices(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Cross-sections `data[s, .., ..]` in increasing `s`.
    pub fn slices(&self) -> impl Iterator<Item = Slice2D<'_>> {
        self.data
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(index, slice)| Slice2D::new(slice, index))
    }

    /// (min, max) over every voxel, used for per-volume normalization.
    pub fn value_range(&self) -> (Voxel, Voxel) {
        self.data
            .iter()
            .fold((Voxel::INFINITY, Voxel::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

#[derive(Debug)]
pub struct Slice2D<'a> {
    pub slice: ArrayView2<'a, Voxel>,
    pub index: usize,
}
impl<'a> Slice2D<'a> {
    pub fn new(slice: ArrayView2<'a, Voxel>, index: usize) -> Self {
        Self { slice, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn label_names_truncate_toward_zero() {
        assert_eq!(Label::new(5.0).dir_name(), "5");
        assert_eq!(Label::new(2.7).dir_name(), "2");
        assert_eq!(Label::new(-1.5).dir_name(), "-1");
    }

    #[test]
    fn slices_walk_first_axis() {
        let data = Array3::from_shape_fn((3, 2, 4), |(x, _, _)| x as f64);
        let masked = MaskedVolume::new(Label::new(1.0), data);
        assert_eq!(masked.num_slices(), 3);
        for s in masked.slices() {
            assert_eq!(s.slice.dim(), (2, 4));
            assert!(s.slice.iter().all(|&v| v == s.index as f64));
        }
    }

    #[test]
    fn value_range_covers_background() {
        let mut data = Array3::zeros((2, 2, 2));
        data[[1, 1, 1]] = 7.0;
        let masked = MaskedVolume::new(Label::new(7.0), data);
        assert_eq!(masked.value_range(), (0.0, 7.0));
    }
}
