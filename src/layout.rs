//! Output directory tree: `<root>/<label>/<stem>-<index>.<ext>`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::Label;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn label_dir(&self, label: Label) -> PathBuf {
        self.root.join(label.dir_name())
    }

    pub fn slice_path(&self, label: Label, stem: &str, index: usize, ext: &str) -> PathBuf {
        self.label_dir(label).join(format!("{stem}-{index}.{ext}"))
    }

    /// Fails if any label directory already exists, or two labels share a name.
    ///
    /// Nothing is created, so a failure here leaves the output root as it was.
    pub fn check(&self, labels: &[Label]) -> Result<()> {
        let mut seen = HashSet::new();
        for &label in labels {
            let dir = self.label_dir(label);
            if !seen.insert(label.dir_name()) || dir.exists() {
                return Err(Error::DirectoryExists(dir));
            }
        }
        Ok(())
    }

    /// Checks every label, then creates the root (if needed) and one directory per label.
    pub fn prepare(&self, labels: &[Label]) -> Result<()> {
        self.check(labels)?;
        fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        for &label in labels {
            let dir = self.label_dir(label);
            // create_dir refuses an existing directory, which also covers a
            // directory appearing between the check and now
            fs::create_dir(&dir).map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => Error::DirectoryExists(dir.clone()),
                _ => Error::io(&dir, e),
            })?;
            log::debug!("created {}", dir.display());
        }
        Ok(())
    }
}
