//! Command dispatcher.
//!
//! Maps the single target argument to one pipeline. Parsing never touches
//! the filesystem; the configuration is only read once a pipeline is about
//! to run.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::build;
use crate::config::{ProfileKind, ProjectConfig};
use crate::doc;
use crate::error::Result;
use crate::listing::Listing;
use crate::process::Executor;

/// Exit status for an invalid invocation, distinct from a failed pipeline.
pub const USAGE_FAILURE: u8 = 255;

#[derive(Parser, Debug)]
#[command(name = "drte-build")]
#[command(about = "Build, test and document drte", version = env!("CARGO_PKG_VERSION"))]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    target: Option<Target>,

    /// Read configuration from this file instead of drte.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every command and decision
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Build drte in a release configuration
    Release,
    /// Build drte in a development configuration
    Devel,
    /// Build and execute the tests
    Test,
    /// Delete build artifacts
    Clean,
    /// Delete build artifacts, binaries and documentation
    Distclean,
    /// Generate documentation
    Doc,
    /// Print this message
    Usage,
}

impl Target {
    pub const ALL: [Target; 7] = [
        Target::Release,
        Target::Devel,
        Target::Test,
        Target::Doc,
        Target::Clean,
        Target::Distclean,
        Target::Usage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Target::Release => "release",
            Target::Devel => "devel",
            Target::Test => "test",
            Target::Clean => "clean",
            Target::Distclean => "distclean",
            Target::Doc => "doc",
            Target::Usage => "usage",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Target::Release => "Build drte in a release configuration.",
            Target::Devel => "Build drte in a development configuration.",
            Target::Test => "Build and execute the tests.",
            Target::Clean => "Delete build artifacts.",
            Target::Distclean => "Delete build artifacts, binaries and documentation.",
            Target::Doc => "Generate documentation.",
            Target::Usage => "Print this message.",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A valid invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub target: Target,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug)]
pub enum Dispatch {
    Run(Request),
    /// `--help` or `--version`; print it and exit successfully.
    Help(clap::Error),
    /// No target, more than one, or an unknown one.
    Invalid(Option<clap::Error>),
}

/// Parses the full argument list, program name included.
pub fn parse<I, T>(args: I) -> Dispatch
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(Cli {
            target: Some(target),
            config,
            verbose,
        }) => Dispatch::Run(Request {
            target,
            config,
            verbose,
        }),
        Ok(_) => Dispatch::Invalid(None),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Dispatch::Help(e)
        }
        Err(e) => Dispatch::Invalid(Some(e)),
    }
}

pub fn usage() -> String {
    let mut text = String::from("Usage: drte-build [--config <PATH>] [-v] <target>\ntargets:\n");
    for target in Target::ALL {
        text.push_str(&format!("\t{} - {}\n", target.name(), target.description()));
    }
    text
}

/// Runs the pipeline selected by `request`.
pub fn execute(request: &Request, exec: &mut dyn Executor, listing: &dyn Listing) -> Result<()> {
    if request.target == Target::Usage {
        print!("{}", usage());
        return Ok(());
    }

    let config = ProjectConfig::load(request.config.as_deref())?;
    debug!(target = %request.target, "dispatching");

    match request.target {
        Target::Release => build::build(exec, listing, &config, ProfileKind::Release).map(drop),
        Target::Devel => build::build(exec, listing, &config, ProfileKind::Devel).map(drop),
        Target::Test => build::run_tests(exec, listing, &config).map(drop),
        Target::Clean => build::clean(listing, &config).map(drop),
        Target::Distclean => build::distclean(listing, &config).map(drop),
        Target::Doc => doc::generate_docs(exec, &config),
        Target::Usage => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::MemoryListing;
    use crate::process::testing::RecordingExecutor;

    fn run(args: &[&str]) -> Dispatch {
        parse(std::iter::once("drte-build").chain(args.iter().copied()))
    }

    #[test]
    fn test_every_verb_parses() {
        for target in Target::ALL {
            match run(&[target.name()]) {
                Dispatch::Run(request) => assert_eq!(request.target, target),
                other => panic!("{} did not parse: {:?}", target, other),
            }
        }
    }

    #[test]
    fn test_no_target_is_invalid() {
        assert!(matches!(run(&[]), Dispatch::Invalid(None)));
        assert!(matches!(run(&["-v"]), Dispatch::Invalid(None)));
    }

    #[test]
    fn test_two_targets_are_invalid() {
        assert!(matches!(run(&["release", "devel"]), Dispatch::Invalid(Some(_))));
        assert!(matches!(run(&["test", "extra"]), Dispatch::Invalid(Some(_))));
    }

    #[test]
    fn test_unknown_target_is_invalid() {
        assert!(matches!(run(&["install"]), Dispatch::Invalid(Some(_))));
        assert!(matches!(run(&["help"]), Dispatch::Invalid(Some(_))));
        assert!(matches!(run(&["Release"]), Dispatch::Invalid(Some(_))));
    }

    #[test]
    fn test_global_options() {
        match run(&["test", "--config", "ci.toml", "-v"]) {
            Dispatch::Run(request) => {
                assert_eq!(request.target, Target::Test);
                assert_eq!(request.config, Some(PathBuf::from("ci.toml")));
                assert!(request.verbose);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_help_and_version() {
        assert!(matches!(run(&["--help"]), Dispatch::Help(_)));
        assert!(matches!(run(&["--version"]), Dispatch::Help(_)));
    }

    #[test]
    fn test_usage_lists_every_target() {
        let text = usage();
        for target in Target::ALL {
            assert!(text.contains(&format!("\t{} - ", target.name())));
        }
    }

    #[test]
    fn test_usage_target_runs_nothing() {
        let request = Request {
            target: Target::Usage,
            config: Some(PathBuf::from("/nonexistent/drte.toml")),
            verbose: false,
        };
        let mut exec = RecordingExecutor::default();
        execute(&request, &mut exec, &MemoryListing::new()).unwrap();
        assert!(exec.calls.is_empty());
    }

    #[test]
    fn test_missing_config_stops_dispatch() {
        let request = Request {
            target: Target::Release,
            config: Some(PathBuf::from("/nonexistent/drte.toml")),
            verbose: false,
        };
        let mut exec = RecordingExecutor::default();
        assert!(execute(&request, &mut exec, &MemoryListing::new()).is_err());
        assert!(exec.calls.is_empty());
    }
}
