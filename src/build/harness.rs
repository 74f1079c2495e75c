//! Test harness assembly.
//!
//! The test pass compiles production and test sources into one object
//! directory. Objects named `test_<identifier>.o` are test entries, `main.o`
//! is the editor's own entry point, and everything else is shared. Each
//! entry is linked with the whole shared set into `<bin_dir>/<identifier>`;
//! `main.o` and the other entries never go into a test binary.

use colored::*;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::compile::OBJECT_EXTENSION;
use super::link::link_objects;
use crate::config::Profile;
use crate::error::{Error, Result};
use crate::listing::Listing;
use crate::process::Executor;

/// Base name of the program entry object.
pub const PROGRAM_ENTRY: &str = "main";

const TEST_PREFIX: &str = "test_";

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern is valid"));

/// Name of a test program, the `<identifier>` in `test_<identifier>.o`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestIdentifier(String);

impl TestIdentifier {
    pub fn parse(identifier: &str) -> Option<Self> {
        IDENTIFIER
            .is_match(identifier)
            .then(|| Self(identifier.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEntry {
    pub identifier: TestIdentifier,
    /// Object file name, e.g. `test_utf8.o`.
    pub object: String,
}

/// Classification of a test object directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestPlan {
    /// Ordered by identifier.
    pub entries: Vec<TestEntry>,
    /// Ordered by name.
    pub shared: Vec<String>,
    /// Set when `main.o` was present and left out.
    pub program_entry: Option<String>,
}

/// Splits object file names into test entries and the shared set.
///
/// Names not ending in `.o` are ignored.
pub fn classify<S: AsRef<str>>(names: &[S]) -> Result<TestPlan> {
    let suffix = format!(".{}", OBJECT_EXTENSION);
    let mut plan = TestPlan::default();
    let mut seen: HashMap<String, String> = HashMap::new();

    for name in names.iter().map(AsRef::as_ref) {
        let Some(base) = name.strip_suffix(&suffix).filter(|b| !b.is_empty()) else {
            continue;
        };

        if base == PROGRAM_ENTRY {
            plan.program_entry = Some(name.to_string());
        } else if let Some(raw) = base.strip_prefix(TEST_PREFIX) {
            let identifier = TestIdentifier::parse(raw)
                .ok_or_else(|| Error::InvalidTestEntry(name.to_string()))?;
            let folded = identifier.as_str().to_ascii_lowercase();
            if let Some(first) = seen.insert(folded, name.to_string()) {
                return Err(Error::DuplicateTestIdentifier {
                    first,
                    second: name.to_string(),
                });
            }
            plan.entries.push(TestEntry {
                identifier,
                object: name.to_string(),
            });
        } else {
            plan.shared.push(name.to_string());
        }
    }

    plan.entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    plan.shared.sort();
    debug!(
        entries = plan.entries.len(),
        shared = plan.shared.len(),
        "classified test objects"
    );
    Ok(plan)
}

/// A linked test program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBinary {
    pub identifier: TestIdentifier,
    pub path: PathBuf,
    pub objects: Vec<PathBuf>,
}

/// Objects linked into the binary for `entry`: the entry first, then the
/// shared set.
pub fn binary_inputs(plan: &TestPlan, entry: &TestEntry, object_dir: &Path) -> Vec<PathBuf> {
    std::iter::once(&entry.object)
        .chain(plan.shared.iter())
        .map(|name| object_dir.join(name))
        .collect()
}

/// Classifies the test profile's object directory and links one binary per
/// test entry into `bin_dir`.
pub fn assemble(
    exec: &mut dyn Executor,
    listing: &dyn Listing,
    profile: &Profile,
    bin_dir: &Path,
) -> Result<Vec<TestBinary>> {
    let names = listing.files(profile.object_dir())?;
    let plan = classify(&names)?;
    if plan.entries.is_empty() {
        return Ok(Vec::new());
    }

    fs::create_dir_all(bin_dir).map_err(|e| Error::io(bin_dir, e))?;
    println!(
        "{} Linking {} test binaries against {} shared objects",
        "🔗".cyan(),
        plan.entries.len(),
        plan.shared.len()
    );

    let mut binaries = Vec::with_capacity(plan.entries.len());
    for entry in &plan.entries {
        let objects = binary_inputs(&plan, entry, profile.object_dir());
        let path = bin_dir.join(entry.identifier.as_str());
        link_objects(exec, profile, &objects, &path)?;
        binaries.push(TestBinary {
            identifier: entry.identifier.clone(),
            path,
            objects,
        });
    }
    Ok(binaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProfileKind, ProjectConfig};
    use crate::listing::MemoryListing;
    use crate::process::testing::RecordingExecutor;

    #[test]
    fn test_classify_entries_shared_and_main() {
        let plan = classify(&["test_foo.o", "test_bar.o", "common.o", "main.o"]).unwrap();

        let ids: Vec<_> = plan.entries.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["bar", "foo"]);
        assert_eq!(plan.shared, vec!["common.o"]);
        assert_eq!(plan.program_entry.as_deref(), Some("main.o"));
    }

    #[test]
    fn test_classify_ignores_non_objects() {
        let plan = classify(&["test_foo.c", "test_foo.o", "buffer.d", "buffer.o", ".o"]).unwrap();
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.shared, vec!["buffer.o"]);
    }

    #[test]
    fn test_main_prefix_is_shared() {
        let plan = classify(&["main_loop.o", "test_main.o"]).unwrap();
        assert_eq!(plan.shared, vec!["main_loop.o"]);
        assert_eq!(plan.entries[0].identifier.as_str(), "main");
        assert_eq!(plan.program_entry, None);
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        assert!(matches!(
            classify(&["test_.o"]),
            Err(Error::InvalidTestEntry(name)) if name == "test_.o"
        ));
        assert!(matches!(
            classify(&["test_foo-bar.o"]),
            Err(Error::InvalidTestEntry(_))
        ));
    }

    #[test]
    fn test_case_insensitive_duplicates_rejected() {
        match classify(&["test_Utf8.o", "test_utf8.o"]) {
            Err(Error::DuplicateTestIdentifier { first, second }) => {
                assert_eq!(first, "test_Utf8.o");
                assert_eq!(second, "test_utf8.o");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_assemble_links_each_entry_with_shared_set_only() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = ProjectConfig::default();
        config.profile.test.compiler = Some("clang".into());
        config.profile.test.ldflags = Some(vec!["-fsanitize=address".into()]);
        config.profile.test.out = Some(PathBuf::from("tests/out"));
        let profile = config.profile(ProfileKind::Test);
        let listing = MemoryListing::new().with_files(
            "tests/out",
            ["test_foo.o", "test_bar.o", "common.o", "main.o"],
        );
        let bin_dir = tmp.path().join("bin");
        let mut exec = RecordingExecutor::default();

        let binaries = assemble(&mut exec, &listing, &profile, &bin_dir).unwrap();

        assert_eq!(binaries.len(), 2);
        let bar = &binaries[0];
        assert_eq!(bar.identifier.as_str(), "bar");
        assert_eq!(bar.path, bin_dir.join("bar"));
        assert_eq!(
            bar.objects,
            vec![
                PathBuf::from("tests/out/test_bar.o"),
                PathBuf::from("tests/out/common.o")
            ]
        );
        for line in exec.lines() {
            assert!(!line.contains("main.o"), "main.o linked: {}", line);
        }
        assert!(!exec.lines()[0].contains("test_foo.o"));
        assert!(!exec.lines()[1].contains("test_bar.o"));
        assert!(exec.lines()[1].contains(&format!("-o {}", bin_dir.join("foo").display())));
    }

    #[test]
    fn test_entry_without_shared_objects_still_links() {
        let plan = classify(&["test_solo.o"]).unwrap();
        let inputs = binary_inputs(&plan, &plan.entries[0], Path::new("tests/out"));
        assert_eq!(inputs, vec![PathBuf::from("tests/out/test_solo.o")]);
    }

    #[test]
    fn test_no_entries_links_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = ProjectConfig::default().profile(ProfileKind::Test);
        let listing = MemoryListing::new().with_files("tests/out", ["buffer.o", "main.o"]);
        let mut exec = RecordingExecutor::default();

        let binaries = assemble(&mut exec, &listing, &profile, &tmp.path().join("bin")).unwrap();

        assert!(binaries.is_empty());
        assert!(exec.calls.is_empty());
    }
}
