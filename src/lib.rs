//! # drte-build - build orchestration for the drte editor
//!
//! Compiles the editor's C sources under a named profile, links them, and
//! assembles and runs one test binary per `tests/test_<name>.c`.
//!
//! ## Targets
//!
//! ```bash
//! drte-build release     # out/release/*.o -> drte
//! drte-build devel       # out/devel/*.o   -> drte-dev (ASan)
//! drte-build test        # tests/out/*.o   -> tests/bin/<name>, then run them
//! drte-build clean       # remove objects and test binaries
//! drte-build distclean   # clean + docs + binaries
//! drte-build doc         # doxygen Doxyfile
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Directory compiler, linker, test harness and pipelines
//! - [`config`] - `drte.toml` parsing and immutable [`config::Profile`]s
//! - [`commands`] - CLI dispatcher
//! - [`process`] - Checked external process execution
//! - [`listing`] - Directory enumeration behind a trait

/// Compile, link, test-harness and cleanup pipelines.
pub mod build;

/// CLI dispatcher.
pub mod commands;

/// Configuration file parsing (`drte.toml`) and build profiles.
pub mod config;

/// Documentation generation (Doxygen).
pub mod doc;

/// Typed pipeline errors.
pub mod error;

/// Directory enumeration.
pub mod listing;

/// External process execution.
pub mod process;

/// Terminal UI utilities (tables).
pub mod ui;

pub use error::{Error, Result};
