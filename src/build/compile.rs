//! Directory compiler: one object per `.c` file.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Profile;
use crate::error::{Error, Result};
use crate::listing::Listing;
use crate::process::{CommandLine, Executor, Outcome};

/// Extension that marks a file as a compilation unit.
pub const SOURCE_EXTENSION: &str = "c";

/// Extension of compiled objects.
pub const OBJECT_EXTENSION: &str = "o";

/// One source file and the object it compiles to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    pub source: PathBuf,
    pub object: PathBuf,
}

impl CompileUnit {
    /// File name of the object, e.g. `buffer.o`.
    pub fn object_name(&self) -> String {
        self.object
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn command(&self, profile: &Profile) -> CommandLine {
        CommandLine::new(profile.compiler())
            .args(profile.compile_flags().iter().cloned())
            .arg("-c")
            .path(&self.source)
            .arg("-o")
            .path(&self.object)
    }
}

/// Lists the compilation units of `source_dir`, in file name order.
pub fn plan_directory(
    listing: &dyn Listing,
    source_dir: &Path,
    object_dir: &Path,
) -> Result<Vec<CompileUnit>> {
    let units = listing
        .files_with_extension(source_dir, SOURCE_EXTENSION)?
        .into_iter()
        .map(|name| {
            let base = &name[..name.len() - SOURCE_EXTENSION.len() - 1];
            CompileUnit {
                source: source_dir.join(&name),
                object: object_dir.join(format!("{}.{}", base, OBJECT_EXTENSION)),
            }
        })
        .collect();
    Ok(units)
}

/// Fails if two units of one pass would write the same object.
pub fn check_collisions(units: &[CompileUnit]) -> Result<()> {
    let mut seen: BTreeMap<&Path, &Path> = BTreeMap::new();
    for unit in units {
        if let Some(first) = seen.insert(&unit.object, &unit.source) {
            return Err(Error::ObjectCollision {
                object: unit.object_name(),
                first: first.to_path_buf(),
                second: unit.source.clone(),
            });
        }
    }
    Ok(())
}

/// Compiles `units` one after another under `profile`.
///
/// The first failing compilation aborts the pass; nothing after it runs.
pub fn compile_units(
    exec: &mut dyn Executor,
    profile: &Profile,
    units: &[CompileUnit],
) -> Result<()> {
    fs::create_dir_all(profile.object_dir()).map_err(|e| Error::io(profile.object_dir(), e))?;

    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(units.len() as u64);
    pb.set_style(style);

    for unit in units {
        let command = unit.command(profile);
        pb.set_message(format!("Compiling {}", unit.source.display()));
        // Prints even when the bar is hidden.
        pb.suspend(|| println!("   {}", command.to_string().dimmed()));
        debug!(profile = %profile.kind(), source = %unit.source.display(), "compiling");

        let outcome = match exec.execute(&command).and_then(|o| o.check(&command)) {
            Ok(outcome) => outcome,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };
        let diagnostics = tool_output(&outcome);
        if !diagnostics.is_empty() {
            pb.suspend(|| {
                println!(
                    "{} Warning in {}:\n{}",
                    "!".yellow(),
                    unit.source.display(),
                    diagnostics
                )
            });
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(())
}

/// Whatever a successful compiler or linker run printed, stdout first.
pub(crate) fn tool_output(outcome: &Outcome) -> String {
    [outcome.stdout.trim_end(), outcome.stderr.trim_end()]
        .iter()
        .filter(|s| !s.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiles every `.c` file of `profile.source_dir()` into its object dir.
pub fn compile_directory(
    exec: &mut dyn Executor,
    listing: &dyn Listing,
    profile: &Profile,
) -> Result<Vec<CompileUnit>> {
    let units = plan_directory(listing, profile.source_dir(), profile.object_dir())?;
    check_collisions(&units)?;
    compile_units(exec, profile, &units)?;
    Ok(units)
}
