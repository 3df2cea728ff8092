//! Integration tests for engine configuration
//!
//! Loads TOML configs from disk and checks they change engine behavior.

use std::fs;
use tempfile::TempDir;
use textpatch::config::{ConfigOrigin, ValidationIssue};
use textpatch::{
    load_from_path, load_from_str, patch_from_text, ConfigError, Engine, EngineConfig, PatchInput,
};

#[test]
fn test_empty_config_is_default() {
    assert_eq!(load_from_str("").unwrap(), EngineConfig::default());
}

#[test]
fn test_full_config_round_trip() {
    let config = load_from_str(
        r#"
[diff]
timeout = 0.0
edit_cost = 6

[match]
threshold = 0.3
distance = 500
max_bits = 64

[patch]
delete_threshold = 0.4
margin = 8

[unified]
context_lines = 1
search_window = 10
line_similarity = 0.9
"#,
    )
    .unwrap();

    assert_eq!(config.diff.edit_cost, 6);
    assert!(config.diff.deadline().is_none());
    assert_eq!(config.matching.threshold, 0.3);
    assert_eq!(config.matching.max_bits, 64);
    assert_eq!(config.patch.margin, 8);
    assert_eq!(config.unified.context_lines, 1);
}

#[test]
fn test_unknown_key_rejected() {
    let err = load_from_str("[match]\nthreshhold = 0.2\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Parse {
            origin: ConfigOrigin::Inline,
            ..
        }
    ));
}

#[test]
fn test_validation_error_from_file_carries_path() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("engine.toml");
    fs::write(&file, "[match]\nmax_bits = 100\n").unwrap();

    match load_from_path(&file).unwrap_err() {
        ConfigError::Invalid { origin, source } => {
            assert_eq!(origin, ConfigOrigin::File(file.clone()));
            assert!(matches!(
                source.issues[0],
                ValidationIssue::OutOfRange {
                    field: "match.max_bits",
                    ..
                }
            ));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn test_margin_changes_patch_context() {
    let old = "The quick brown fox jumps over the lazy dog.";
    let new = "The quick brown fox leaps over the lazy dog.";

    let narrow = Engine::new(load_from_str("[patch]\nmargin = 2\n").unwrap());
    let wide = Engine::new(load_from_str("[patch]\nmargin = 6\n").unwrap());

    let narrow_patch = narrow.patch_make(PatchInput::Texts(old, new));
    let wide_patch = wide.patch_make(PatchInput::Texts(old, new));
    assert_eq!(narrow_patch.len(), 1);
    assert!(wide_patch[0].length1 > narrow_patch[0].length1);

    for (engine, patches) in [(&narrow, narrow_patch), (&wide, wide_patch)] {
        let text = textpatch::patch_to_text(&patches);
        let parsed = patch_from_text(&text).unwrap();
        assert_eq!(engine.patch_apply(&parsed, old), (new.to_string(), vec![true]));
    }
}

#[test]
fn test_strict_match_threshold_rejects_drifted_text() {
    let old = "The quick brown fox jumps over the lazy dog.";
    let new = "The quick brown fox leaps over the lazy dog.";
    let drifted = "The quick brown cat jumps over the lazy dog.";

    let lenient = Engine::default();
    let strict = Engine::new(load_from_str("[match]\nthreshold = 0.0\n").unwrap());

    let patches = lenient.patch_make(PatchInput::Texts(old, new));
    let (_, results) = lenient.patch_apply(&patches, drifted);
    assert_eq!(results, vec![true]);

    let (patched, results) = strict.patch_apply(&patches, drifted);
    assert_eq!(results, vec![false]);
    assert_eq!(patched, drifted);
}
