//! Filesystem lookup under the uploads root.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Handle to the directory banner image files are expected to live under.
#[derive(Clone, Debug)]
pub struct UploadsRoot {
    root: PathBuf,
}

impl UploadsRoot {
    /// Open the uploads root, failing if it is not an accessible directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            bail!(
                "uploads root {} is not an accessible directory",
                root.display()
            );
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Whether `rel` names an existing file under the root.
    pub fn contains(&self, rel: &str) -> bool {
        self.root.join(rel).is_file()
    }

    /// Recursively search for a file named `name`, returning the first
    /// match as a path relative to the root with forward-slash separators.
    /// The walk is lazy and stops at the first hit.
    pub fn find_by_name(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .find(|entry| {
                entry.file_type().is_file() && entry.file_name().to_string_lossy() == name
            })
            .map(|entry| {
                let rel = entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap_or_else(|_| entry.path());
                normalize_separators(&rel.to_string_lossy())
            })
    }
}

/// Replace backslash separators so stored paths are uniform.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}
