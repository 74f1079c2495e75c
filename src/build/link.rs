//! Linker: objects in, one binary out.

use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::compile::{OBJECT_EXTENSION, tool_output};
use crate::config::Profile;
use crate::error::{Error, Result};
use crate::listing::Listing;
use crate::process::{CommandLine, Executor};

pub fn link_command(profile: &Profile, objects: &[PathBuf], output: &Path) -> CommandLine {
    CommandLine::new(profile.compiler())
        .args(profile.link_flags().iter().cloned())
        .arg("-o")
        .path(output)
        .args(objects.iter().map(|o| o.to_string_lossy().into_owned()))
}

/// Links exactly `objects` into `output`.
pub fn link_objects(
    exec: &mut dyn Executor,
    profile: &Profile,
    objects: &[PathBuf],
    output: &Path,
) -> Result<()> {
    if objects.is_empty() {
        return Err(Error::NoObjects(output.to_path_buf()));
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let command = link_command(profile, objects, output);
    println!("   {}", command.to_string().dimmed());
    debug!(output = %output.display(), objects = objects.len(), "linking");

    let outcome = exec.execute(&command)?.check(&command)?;
    let diagnostics = tool_output(&outcome);
    if !diagnostics.is_empty() {
        println!(
            "{} Linker output for {}:\n{}",
            "!".yellow(),
            output.display(),
            diagnostics
        );
    }
    Ok(())
}

/// Links every object in the profile's object directory into `output`.
///
/// Whatever `.o` files the directory holds are linked, including stale
/// ones; callers own the directory's contents.
pub fn link_directory(
    exec: &mut dyn Executor,
    listing: &dyn Listing,
    profile: &Profile,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let objects: Vec<PathBuf> = listing
        .files_with_extension(profile.object_dir(), OBJECT_EXTENSION)?
        .into_iter()
        .map(|name| profile.object_dir().join(name))
        .collect();
    link_objects(exec, profile, &objects, output)?;
    Ok(objects)
}
