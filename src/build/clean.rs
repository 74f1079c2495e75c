//! Build artifact cleanup.
//!
//! - `clean` - delete the objects of every profile and all test binaries
//! - `distclean` - `clean`, then the generated docs, both top-level
//!   binaries and `compile_commands.json`
//!
//! Both are idempotent: missing files and directories are skipped.

use colored::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::compile::OBJECT_EXTENSION;
use super::core::COMPILE_COMMANDS;
use crate::config::{ProfileKind, ProjectConfig};
use crate::error::{Error, Result};
use crate::listing::Listing;

/// What a cleanup pass removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
}

impl CleanReport {
    fn print(&self) {
        if self.removed.is_empty() {
            println!("{} Nothing to clean", "!".yellow());
        } else {
            println!(
                "{} Clean complete ({} removed).",
                "✓".green(),
                self.removed.len()
            );
        }
    }
}

fn remove_file(path: &Path, report: &mut CleanReport) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            report.removed.push(path.to_path_buf());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn clean_into(
    listing: &dyn Listing,
    config: &ProjectConfig,
    report: &mut CleanReport,
) -> Result<()> {
    let mut object_dirs: Vec<PathBuf> = Vec::new();
    for kind in [ProfileKind::Release, ProfileKind::Devel, ProfileKind::Test] {
        let dir = config.profile(kind).object_dir().to_path_buf();
        if !object_dirs.contains(&dir) {
            object_dirs.push(dir);
        }
    }

    for dir in &object_dirs {
        for name in listing.files_with_extension(dir, OBJECT_EXTENSION)? {
            remove_file(&dir.join(name), report)?;
        }
    }
    for name in listing.files(&config.test.bin_dir)? {
        remove_file(&config.test.bin_dir.join(name), report)?;
    }
    Ok(())
}

/// Deletes object files from every profile's output directory and every
/// file in the test-binary directory.
pub fn clean(listing: &dyn Listing, config: &ProjectConfig) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    clean_into(listing, config, &mut report)?;
    report.print();
    Ok(report)
}

/// `clean`, then removes the documentation output (the directory itself is
/// kept), both top-level binaries and `compile_commands.json`.
pub fn distclean(listing: &dyn Listing, config: &ProjectConfig) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    clean_into(listing, config, &mut report)?;

    let doc = &config.doc.out;
    if doc.is_dir() {
        let entries = fs::read_dir(doc).map_err(|e| Error::io(doc, e))?;
        for entry in entries {
            let path = entry.map_err(|e| Error::io(doc, e))?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
                debug!(path = %path.display(), "removed directory");
                report.removed.push(path);
            } else {
                remove_file(&path, &mut report)?;
            }
        }
    }

    for kind in [ProfileKind::Release, ProfileKind::Devel] {
        if let Some(binary) = config.profile(kind).binary() {
            remove_file(binary, &mut report)?;
        }
    }
    remove_file(Path::new(COMPILE_COMMANDS), &mut report)?;

    report.print();
    Ok(report)
}
