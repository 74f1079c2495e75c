//! Integration tests for target dispatch.
//!
//! Invalid invocations must print usage, exit with the usage-failure
//! status and leave the project directory untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn drte_build() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_drte-build"))
}

fn run(project_dir: &Path, args: &[&str]) -> Output {
    Command::new(drte_build())
        .args(args)
        .current_dir(project_dir)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run drte-build")
}

fn output_text(output: &Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn snapshot(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = list_tree(dir);
    entries.sort();
    entries
}

fn list_tree(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            out.extend(list_tree(&path));
        }
        out.push(path);
    }
    out
}

fn seeded_project() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let root = tmp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("out/release")).unwrap();
    fs::write(root.join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
    fs::write(root.join("out/release/main.o"), "stale").unwrap();
    tmp
}

#[test]
fn invalid_invocations_print_usage_and_fail() {
    let project = seeded_project();
    let before = snapshot(project.path());

    for args in [
        vec![],
        vec!["release", "devel"],
        vec!["clean", "extra"],
        vec!["bogus"],
        vec!["help"],
    ] {
        let output = run(project.path(), &args);
        let text = output_text(&output);

        assert_eq!(
            output.status.code(),
            Some(255),
            "{:?} should fail with the usage status.\n{}",
            args,
            text
        );
        assert!(
            text.contains("Usage: drte-build"),
            "{:?} should print usage.\n{}",
            args,
            text
        );
        assert!(text.contains("distclean - "), "{}", text);
        assert_eq!(snapshot(project.path()), before, "{:?} mutated the project", args);
    }
}

#[test]
fn usage_target_succeeds() {
    let project = seeded_project();
    let output = run(project.path(), &["usage"]);
    assert!(output.status.success(), "{}", output_text(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage: drte-build"));
}

#[test]
fn help_flag_succeeds() {
    let project = seeded_project();
    let output = run(project.path(), &["--help"]);
    assert!(output.status.success(), "{}", output_text(&output));
}

#[test]
fn clean_twice_leaves_the_same_state() {
    let project = seeded_project();
    let root = project.path();
    fs::create_dir_all(root.join("tests/bin")).unwrap();
    fs::write(root.join("tests/bin/utf8"), "binary").unwrap();

    let first = run(root, &["clean"]);
    assert!(first.status.success(), "{}", output_text(&first));
    let after_first = snapshot(root);

    let second = run(root, &["clean"]);
    assert!(second.status.success(), "{}", output_text(&second));
    assert_eq!(snapshot(root), after_first);

    assert!(!root.join("out/release/main.o").exists());
    assert!(!root.join("tests/bin/utf8").exists());
    assert!(root.join("src/main.c").exists());
    assert!(output_text(&second).contains("Nothing to clean"));
}

#[test]
fn invalid_config_fails_the_pipeline() {
    let project = seeded_project();
    fs::write(project.path().join("drte.toml"), "[profile.release]\nspeed = 11\n").unwrap();

    let output = run(project.path(), &["clean"]);

    assert_eq!(output.status.code(), Some(1), "{}", output_text(&output));
    assert!(output_text(&output).contains("drte.toml"));
    assert!(project.path().join("out/release/main.o").exists());
}
