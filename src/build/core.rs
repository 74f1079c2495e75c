use super::compile::{CompileUnit, compile_directory};
use super::link::link_directory;
use crate::config::{Profile, ProfileKind, ProjectConfig};
use crate::error::{Error, Result};
use crate::listing::Listing;
use crate::process::Executor;
use colored::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Written after a devel build for editor integration.
pub const COMPILE_COMMANDS: &str = "compile_commands.json";

// --- CORE: Build a profile ---
/// Compiles the profile's source directory and links its binary.
///
/// Returns the path of the linked binary.
pub fn build_profile(
    exec: &mut dyn Executor,
    listing: &dyn Listing,
    profile: &Profile,
) -> Result<PathBuf> {
    let start_time = Instant::now();
    let Some(binary) = profile.binary() else {
        return Err(Error::Config(format!(
            "profile {} has no binary to link",
            profile.kind()
        )));
    };

    println!(
        "{} Building {} ({}) with {}",
        "🔨".cyan(),
        binary.display().to_string().bold(),
        profile.kind(),
        profile.compiler()
    );

    let units = compile_directory(exec, listing, profile)?;
    if units.is_empty() {
        return Err(Error::NoSources(profile.source_dir().to_path_buf()));
    }

    if profile.kind() == ProfileKind::Devel {
        write_compile_commands(profile, &units, Path::new(COMPILE_COMMANDS))?;
    }

    println!("   {} Linking...", "🔗".cyan());
    link_directory(exec, listing, profile, binary)?;

    println!(
        "{} Build finished in {:.2?}",
        "✓".green(),
        start_time.elapsed()
    );
    Ok(binary.to_path_buf())
}

/// Dispatch entry for `release` and `devel`.
pub fn build(
    exec: &mut dyn Executor,
    listing: &dyn Listing,
    config: &ProjectConfig,
    kind: ProfileKind,
) -> Result<PathBuf> {
    let profile = config.profile(kind);
    build_profile(exec, listing, &profile)
}

fn write_compile_commands(profile: &Profile, units: &[CompileUnit], path: &Path) -> Result<()> {
    let directory = std::env::current_dir()
        .map_err(|e| Error::io(".", e))?
        .to_string_lossy()
        .into_owned();

    let entries: Vec<serde_json::Value> = units
        .iter()
        .map(|unit| {
            json!({
                "directory": directory,
                "command": unit.command(profile).to_string(),
                "file": unit.source.to_string_lossy(),
            })
        })
        .collect();

    let text = serde_json::to_string_pretty(&entries)
        .map_err(|e| Error::Config(format!("cannot encode {}: {}", path.display(), e)))?;
    fs::write(path, text).map_err(|e| Error::io(path, e))
}
