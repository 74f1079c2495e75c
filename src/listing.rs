//! Directory enumeration.
//!
//! Build decisions are made from directory listings only. They go through
//! [`Listing`] so classification and linking can be exercised against an
//! in-memory tree.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Lists the regular files directly inside a directory.
pub trait Listing {
    /// File names (not paths) in lexicographic order. A missing
    /// directory lists as empty.
    fn files(&self, dir: &Path) -> Result<Vec<String>>;

    /// Names in `dir` ending in `.<extension>`, in lexicographic order.
    fn files_with_extension(&self, dir: &Path, extension: &str) -> Result<Vec<String>> {
        let suffix = format!(".{}", extension);
        Ok(self
            .files(dir)?
            .into_iter()
            .filter(|name| name.len() > suffix.len() && name.ends_with(&suffix))
            .collect())
    }
}

/// Lists the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsListing;

impl Listing for FsListing {
    fn files(&self, dir: &Path) -> Result<Vec<String>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                Error::io(path, e.into())
            })?;
            // Symlinks count when they resolve to a regular file.
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => warn!(path = %entry.path().display(), "skipping non UTF-8 file name"),
            }
        }
        Ok(names)
    }
}

/// An in-memory directory tree.
#[derive(Debug, Default, Clone)]
pub struct MemoryListing {
    dirs: BTreeMap<PathBuf, BTreeSet<String>>,
}

impl MemoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(mut self, dir: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(dir, names);
        self
    }

    pub fn insert<I, S>(&mut self, dir: impl Into<PathBuf>, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs
            .entry(dir.into())
            .or_default()
            .extend(names.into_iter().map(Into::into));
    }
}

impl Listing for MemoryListing {
    fn files(&self, dir: &Path) -> Result<Vec<String>> {
        Ok(self
            .dirs
            .get(dir)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default())
    }
}
