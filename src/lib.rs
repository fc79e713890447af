//! Split a labeled 3D volume into per-label stacks of 2D images.
//!
//! Each distinct voxel value becomes a directory `<output>/<label>/`, holding
//! one image per slice along the first axis, named `<stem>-<index>.<ext>`.

pub mod common;
pub mod config;
pub mod error;
pub mod layout;
pub mod partition;
pub mod pipeline;
pub mod raster;
pub mod restack;
pub mod volume;

pub use common::{Label, MaskedVolume, Slice2D, Volume, Voxel};
pub use config::Config;
pub use error::{Error, Result};
pub use layout::OutputLayout;
pub use raster::OutputFormat;
