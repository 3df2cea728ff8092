//! Integration tests for the command-line interface
//!
//! Drives the built binary through diff, make and apply.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const OLD: &str = "The quick brown fox jumps over the lazy dog.\n";
const NEW: &str = "That quick brown fox jumped over a lazy dog.\n";

fn textpatch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_textpatch"))
        .args(args)
        .env_remove("TEXTPATCH_LOG")
        .output()
        .unwrap()
}

/// Helper to create a workspace holding an old and a new file
fn setup_test_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("old.txt"), OLD).unwrap();
    fs::write(dir.path().join("new.txt"), NEW).unwrap();
    dir
}

fn path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let output = textpatch(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("diff"));
    assert!(text.contains("make"));
    assert!(text.contains("apply"));
}

#[test]
fn test_apply_help() {
    let output = textpatch(&["apply", "--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("--dry-run"));
}

#[test]
fn test_make_prints_patch_text() {
    let dir = setup_test_workspace();
    let output = textpatch(&["make", &path(&dir, "old.txt"), &path(&dir, "new.txt")]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("@@ -1,"));
    assert!(text.contains("+at\n"));
}

#[test]
fn test_make_then_apply_round_trip() {
    let dir = setup_test_workspace();
    let patch = path(&dir, "fox.patch");

    let output = textpatch(&[
        "make",
        &path(&dir, "old.txt"),
        &path(&dir, "new.txt"),
        "-o",
        &patch,
    ]);
    assert!(output.status.success());
    assert!(Path::new(&patch).exists());

    let output = textpatch(&["apply", &patch, &path(&dir, "old.txt")]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("hunk 1: applied"));
    assert_eq!(fs::read_to_string(dir.path().join("old.txt")).unwrap(), NEW);
}

#[test]
fn test_unified_make_then_apply() {
    let dir = TempDir::new().unwrap();
    let old = "alpha\nbeta\ngamma\ndelta\n";
    let new = "alpha\nBETA\ngamma\ndelta\nepsilon\n";
    fs::write(dir.path().join("a.txt"), old).unwrap();
    fs::write(dir.path().join("b.txt"), new).unwrap();

    let output = textpatch(&[
        "make",
        "--unified",
        &path(&dir, "a.txt"),
        &path(&dir, "b.txt"),
    ]);
    assert!(output.status.success());
    let diff = stdout(&output);
    assert!(diff.starts_with("--- "));
    assert!(diff.contains("-beta\n+BETA\n"));
    fs::write(dir.path().join("change.diff"), &diff).unwrap();

    let output = textpatch(&[
        "apply",
        "-u",
        &path(&dir, "change.diff"),
        &path(&dir, "a.txt"),
        "-o",
        &path(&dir, "out.txt"),
    ]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), new);
    // -o leaves the target alone
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), old);
}

#[test]
fn test_apply_dry_run_writes_nothing() {
    let dir = setup_test_workspace();
    let patch_text = stdout(&textpatch(&[
        "make",
        &path(&dir, "old.txt"),
        &path(&dir, "new.txt"),
    ]));
    fs::write(dir.path().join("fox.patch"), patch_text).unwrap();

    let output = textpatch(&[
        "apply",
        "--dry-run",
        &path(&dir, "fox.patch"),
        &path(&dir, "old.txt"),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("DRY RUN"));
    assert_eq!(fs::read_to_string(dir.path().join("old.txt")).unwrap(), OLD);
}

#[test]
fn test_apply_failed_hunks_exit_nonzero() {
    let dir = setup_test_workspace();
    let patch_text = stdout(&textpatch(&[
        "make",
        &path(&dir, "old.txt"),
        &path(&dir, "new.txt"),
    ]));
    fs::write(dir.path().join("fox.patch"), patch_text).unwrap();
    let unrelated = "I am the very model of a modern major general.\n";
    fs::write(dir.path().join("other.txt"), unrelated).unwrap();

    let output = textpatch(&["apply", &path(&dir, "fox.patch"), &path(&dir, "other.txt")]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("failed"));
    assert_eq!(
        fs::read_to_string(dir.path().join("other.txt")).unwrap(),
        unrelated
    );
}

#[test]
fn test_apply_rejects_malformed_patch() {
    let dir = setup_test_workspace();
    fs::write(dir.path().join("bad.patch"), "Bad\nPatch\n").unwrap();

    let output = textpatch(&["apply", &path(&dir, "bad.patch"), &path(&dir, "old.txt")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid patch"), "{stderr}");
}

#[test]
fn test_diff_json_output() {
    let dir = setup_test_workspace();
    let output = textpatch(&[
        "diff",
        "--format",
        "json",
        &path(&dir, "old.txt"),
        &path(&dir, "new.txt"),
    ]);
    assert!(output.status.success());

    let diffs: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let diffs = diffs.as_array().unwrap();
    assert!(!diffs.is_empty());
    assert_eq!(diffs[0]["op"], "equal");
    assert_eq!(diffs[0]["text"], "Th");
}

#[test]
fn test_diff_delta_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "jumps").unwrap();
    fs::write(dir.path().join("b.txt"), "jumped").unwrap();

    let output = textpatch(&[
        "diff",
        "--format",
        "delta",
        "--cleanup",
        "none",
        &path(&dir, "a.txt"),
        &path(&dir, "b.txt"),
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "=4\t-1\t+ed");
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = setup_test_workspace();
    fs::write(dir.path().join("engine.toml"), "[match]\nthreshold = 2.0\n").unwrap();

    let output = textpatch(&[
        "--config",
        &path(&dir, "engine.toml"),
        "diff",
        &path(&dir, "old.txt"),
        &path(&dir, "new.txt"),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("match.threshold"), "{stderr}");
}
