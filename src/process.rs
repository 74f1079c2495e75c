//! Checked execution of external programs.
//!
//! Every compiler, linker, generator and test binary goes through the
//! [`Executor`] trait, which returns an explicit [`Outcome`] instead of
//! letting exit statuses fall on the floor.

use std::ffi::OsStr;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

/// A program and its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    merged: bool,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            merged: false,
        }
    }

    /// Sends stderr into the same pipe as stdout, so the captured
    /// `stdout` keeps the order the child wrote in and `stderr` is empty.
    pub fn merged_output(mut self) -> Self {
        self.merged = true;
        self
    }

    pub fn merges_output(&self) -> bool {
        self.merged
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a path argument.
    pub fn path(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Outcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turns a failed outcome into a [`Error::Toolchain`].
    pub fn check(self, command: &CommandLine) -> Result<Outcome> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::Toolchain {
                command: command.to_string(),
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs external programs to completion, one at a time.
pub trait Executor {
    /// Runs `command`, blocking until it exits. Errors only when the
    /// program cannot be started; a non-zero exit is reported in the
    /// returned [`Outcome`].
    fn execute(&mut self, command: &CommandLine) -> Result<Outcome>;
}

/// Executes commands as real child processes with captured output.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn run_merged(command: &CommandLine) -> Result<Outcome> {
        let spawn_error = |source| Error::Spawn {
            program: command.program().to_string(),
            source,
        };

        let (mut reader, writer) = std::io::pipe().map_err(spawn_error)?;
        let mut child = {
            let mut process = Command::new(OsStr::new(command.program()));
            process
                .args(command.arguments())
                .stdin(Stdio::null())
                .stdout(writer.try_clone().map_err(spawn_error)?)
                .stderr(writer);
            // `process` owns the parent's write ends; they close when it drops.
            process.spawn().map_err(spawn_error)?
        };

        let mut output = Vec::new();
        let read = reader.read_to_end(&mut output);
        let status = child.wait().map_err(spawn_error)?;
        read.map_err(spawn_error)?;

        Ok(Outcome {
            code: status.code(),
            stdout: String::from_utf8_lossy(&output).into_owned(),
            stderr: String::new(),
        })
    }

    fn run_captured(command: &CommandLine) -> Result<Outcome> {
        let output = Command::new(OsStr::new(command.program()))
            .args(command.arguments())
            .output()
            .map_err(|source| Error::Spawn {
                program: command.program().to_string(),
                source,
            })?;

        Ok(Outcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl Executor for SystemExecutor {
    fn execute(&mut self, command: &CommandLine) -> Result<Outcome> {
        debug!(command = %command, merged = command.merges_output(), "spawning");
        let outcome = if command.merges_output() {
            Self::run_merged(command)?
        } else {
            Self::run_captured(command)?
        };
        debug!(command = %command, code = ?outcome.code, "finished");
        Ok(outcome)
    }
}
