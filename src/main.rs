//! # drte-build CLI Entry Point
//!
//! Parses the single target argument and routes it to a pipeline.
//!
//! Exit status: 0 on success, 1 when a pipeline fails, 255 when the
//! invocation itself is invalid.

use anyhow::{Context, Result};
use colored::*;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use drte_build::build::FeedbackAnalyzer;
use drte_build::commands::{self, Dispatch, Request, USAGE_FAILURE};
use drte_build::listing::FsListing;
use drte_build::process::SystemExecutor;

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(request: &Request) -> Result<()> {
    let mut exec = SystemExecutor;
    commands::execute(request, &mut exec, &FsListing)
        .with_context(|| format!("{} failed", request.target))
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {}", "x".red(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }

    let Some(build_err) = err.downcast_ref::<drte_build::Error>() else {
        return;
    };
    if let drte_build::Error::Toolchain { stderr, .. } = build_err
        && !stderr.trim().is_empty()
    {
        eprintln!("\n{}", stderr.trim_end());
    }
    if let Some(hint) = FeedbackAnalyzer::for_error(build_err) {
        eprintln!("\n{} {}", "💡".yellow(), hint);
    }
}

fn main() -> ExitCode {
    match commands::parse(std::env::args_os()) {
        Dispatch::Help(info) => {
            let _ = info.print();
            ExitCode::SUCCESS
        }
        Dispatch::Invalid(reason) => {
            if let Some(reason) = reason {
                let rendered = reason.render().to_string();
                if let Some(first) = rendered.lines().next() {
                    eprintln!("{} {}", "x".red(), first);
                }
            }
            print!("{}", commands::usage());
            ExitCode::from(USAGE_FAILURE)
        }
        Dispatch::Run(request) => {
            init_logging(request.verbose);
            match run(&request) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    report(&err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
