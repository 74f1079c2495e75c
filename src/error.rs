//! Error types for the build pipelines.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop a build, test or clean pass.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external program could not be started at all.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external toolchain command exited unsuccessfully.
    #[error("command failed ({}): {command}", describe_code(*code))]
    Toolchain {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A compile pass found nothing to compile.
    #[error("no source files found in {}", .0.display())]
    NoSources(PathBuf),

    /// A link step was asked to link an empty object set.
    #[error("no object files to link into {}", .0.display())]
    NoObjects(PathBuf),

    /// Two sources in one pass would write the same object file.
    #[error("{} and {} both compile to {object}", first.display(), second.display())]
    ObjectCollision {
        object: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// An object looks like a test entry but its identifier is unusable.
    #[error("invalid test entry `{0}`: expected test_<identifier> with letters, digits or '_'")]
    InvalidTestEntry(String),

    /// Two test entries would produce binaries with the same name.
    #[error("test entries `{first}` and `{second}` map to the same test binary")]
    DuplicateTestIdentifier { first: String, second: String },

    /// One or more test binaries reported failure.
    #[error("{failed} of {total} test binaries failed")]
    TestsFailed { failed: usize, total: usize },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
