//! Project configuration (`drte.toml`) and build profiles.
//!
//! Every key is optional. Omitted keys fall back to the built-in layout
//! of the drte repository, so a checkout without a config file builds
//! exactly as before.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "drte.toml";

/// The named build configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Release,
    Devel,
    Test,
}

impl ProfileKind {
    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::Release => "release",
            ProfileKind::Devel => "devel",
            ProfileKind::Test => "test",
        }
    }

    fn default_cflags(self) -> &'static [&'static str] {
        match self {
            ProfileKind::Release => &["-Os", "-std=c99", "-D_POSIX_C_SOURCE"],
            ProfileKind::Devel => &[
                "-O0",
                "-g",
                "-std=c99",
                "-Wall",
                "-Wextra",
                "-Wmissing-prototypes",
                "-fsanitize=address",
                "-fno-omit-frame-pointer",
                "-D_POSIX_C_SOURCE",
            ],
            ProfileKind::Test => &[
                "-O0",
                "-g",
                "-std=c99",
                "-Wall",
                "-Wextra",
                "-DDRTE_TEST",
                "-Wno-implicit-function-declaration",
                "-fno-omit-frame-pointer",
                "-fsanitize=address",
                "-D_POSIX_C_SOURCE",
            ],
        }
    }

    fn default_ldflags(self) -> &'static [&'static str] {
        match self {
            ProfileKind::Release => &["-static"],
            ProfileKind::Devel => &["-fsanitize=address", "-fno-omit-frame-pointer"],
            ProfileKind::Test => &["-fno-omit-frame-pointer", "-fsanitize=address"],
        }
    }

    fn default_out(self) -> &'static str {
        match self {
            ProfileKind::Release => "out/release",
            ProfileKind::Devel => "out/devel",
            ProfileKind::Test => "tests/out",
        }
    }

    fn default_bin(self) -> Option<&'static str> {
        match self {
            ProfileKind::Release => Some("drte"),
            ProfileKind::Devel => Some("drte-dev"),
            ProfileKind::Test => None,
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved, immutable build profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    kind: ProfileKind,
    compiler: String,
    compile_flags: Vec<String>,
    link_flags: Vec<String>,
    source_dir: PathBuf,
    object_dir: PathBuf,
    binary: Option<PathBuf>,
}

impl Profile {
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    pub fn compile_flags(&self) -> &[String] {
        &self.compile_flags
    }

    pub fn link_flags(&self) -> &[String] {
        &self.link_flags
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn object_dir(&self) -> &Path {
        &self.object_dir
    }

    /// Final binary; `None` for the test profile, which links one binary
    /// per test entry instead.
    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }
}

/// Raw `[profile.<name>]` table.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub compiler: Option<String>,
    pub cflags: Option<Vec<String>>,
    pub ldflags: Option<Vec<String>>,
    pub out: Option<PathBuf>,
    pub bin: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileTable {
    pub release: ProfileConfig,
    pub devel: ProfileConfig,
    pub test: ProfileConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    pub source: PathBuf,
    pub bin_dir: PathBuf,
    pub fail_fast: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("tests"),
            bin_dir: PathBuf::from("tests/bin"),
            fail_fast: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct DocConfig {
    pub out: PathBuf,
    pub command: String,
    pub args: Vec<String>,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            out: PathBuf::from("doc"),
            command: "doxygen".to_string(),
            args: vec!["Doxyfile".to_string()],
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub source: PathBuf,
    pub profile: ProfileTable,
    pub test: TestConfig,
    pub doc: DocConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            profile: ProfileTable::default(),
            test: TestConfig::default(),
            doc: DocConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Loads `explicit` (which must exist) or `drte.toml` if present,
    /// otherwise the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(Error::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            Some(path) => path.to_path_buf(),
            None if Path::new(CONFIG_FILE).exists() => PathBuf::from(CONFIG_FILE),
            None => {
                debug!("no {} found, using built-in defaults", CONFIG_FILE);
                return Ok(Self::default());
            }
        };

        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let config = Self::parse(&text).map_err(|e| match e {
            ParseError::Toml(source) => Error::ConfigParse {
                path: path.clone(),
                source,
            },
            ParseError::Invalid(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn parse(text: &str) -> std::result::Result<Self, ParseError> {
        let config: ProjectConfig = toml::from_str(text).map_err(ParseError::Toml)?;
        config.validate().map_err(ParseError::Invalid)?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.profile.test.bin.is_some() {
            return Err(
                "profile.test does not produce a single binary; set [test] bin_dir instead"
                    .to_string(),
            );
        }
        for (kind, raw) in self.profiles() {
            if raw.compiler.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(format!("profile.{}.compiler must not be empty", kind));
            }
            if raw.bin.as_deref().is_some_and(|b| b.trim().is_empty()) {
                return Err(format!("profile.{}.bin must not be empty", kind));
            }
        }
        if self.doc.command.trim().is_empty() {
            return Err("doc.command must not be empty".to_string());
        }
        Ok(())
    }

    fn profiles(&self) -> [(ProfileKind, &ProfileConfig); 3] {
        [
            (ProfileKind::Release, &self.profile.release),
            (ProfileKind::Devel, &self.profile.devel),
            (ProfileKind::Test, &self.profile.test),
        ]
    }

    /// Resolves a profile, taking the compiler from the config, then
    /// `$CC`, then `clang`.
    pub fn profile(&self, kind: ProfileKind) -> Profile {
        let env_cc = std::env::var("CC").ok().filter(|cc| !cc.trim().is_empty());
        self.resolve_profile(kind, env_cc)
    }

    fn resolve_profile(&self, kind: ProfileKind, env_cc: Option<String>) -> Profile {
        let raw = match kind {
            ProfileKind::Release => &self.profile.release,
            ProfileKind::Devel => &self.profile.devel,
            ProfileKind::Test => &self.profile.test,
        };
        let owned = |flags: &[&str]| flags.iter().map(|f| f.to_string()).collect::<Vec<_>>();

        Profile {
            kind,
            compiler: raw
                .compiler
                .clone()
                .or(env_cc)
                .unwrap_or_else(|| "clang".to_string()),
            compile_flags: raw
                .cflags
                .clone()
                .unwrap_or_else(|| owned(kind.default_cflags())),
            link_flags: raw
                .ldflags
                .clone()
                .unwrap_or_else(|| owned(kind.default_ldflags())),
            source_dir: self.source.clone(),
            object_dir: raw
                .out
                .clone()
                .unwrap_or_else(|| PathBuf::from(kind.default_out())),
            binary: raw
                .bin
                .clone()
                .or_else(|| kind.default_bin().map(str::to_string))
                .map(PathBuf::from),
        }
    }
}

#[derive(Debug)]
enum ParseError {
    Toml(toml::de::Error),
    Invalid(String),
}
