//! Known-answer scenarios for diff, patch and unified patches.

use textpatch::diff::{text1, text2};
use textpatch::{
    diff_main, patch_from_text, patch_to_text, Diff, Engine, EngineConfig, FormatError,
    Operation, PatchInput, UnifiedPatch,
};

fn engine() -> Engine {
    let mut config = EngineConfig::default();
    config.diff.timeout = 0.0;
    Engine::new(config)
}

#[test]
fn test_hello_goodbye_diff() {
    assert_eq!(
        diff_main("Hello world.", "Goodbye world.", false, None),
        vec![
            Diff::delete("Hell"),
            Diff::insert("G"),
            Diff::equal("o"),
            Diff::insert("odbye"),
            Diff::equal(" world."),
        ]
    );
}

#[test]
fn test_two_hunk_unified_block_parses() {
    let block = "@@ -1,8 +1,5 @@\n-The quick\n-brown fox\n-jumps\n+The quick brown fox jumps\n over\n the\n lazy\n-old\n-dog\n+dog\n@@ -12,3 +9,4 @@\n alpha\n+beta\n gamma\n delta\n";
    let patch = UnifiedPatch::parse(block).unwrap();
    assert_eq!(patch.hunks.len(), 2);
    assert_eq!(patch.hunks[0].lines[0], Diff::delete("The quick"));
    assert_eq!(patch.hunks[1].old_start, 12);
    assert_eq!(patch.to_text(), block);
}

#[test]
fn test_truncated_patch_block_rejected() {
    let truncated = "@@ -1,11 +1,12 @@\n Th\n-e\n+at\n";
    assert!(matches!(
        patch_from_text(truncated),
        Err(FormatError::LengthMismatch { .. })
    ));
    assert!(UnifiedPatch::parse("@@ -1,3 +1,3 @@\n a\n-b\n").is_err());
}

#[test]
fn test_patch_survives_drift() {
    let engine = engine();
    let old = "The quick brown fox jumps over the lazy dog.";
    let new = "That quick brown fox jumped over a lazy dog.";
    let text = patch_to_text(&engine.patch_make(PatchInput::Texts(old, new)));

    let patches = patch_from_text(&text).unwrap();
    let (patched, results) =
        engine.patch_apply(&patches, "The quick red rabbit jumps over the tired tiger.");
    assert_eq!(patched, "That quick red rabbit jumped over a tired tiger.");
    assert_eq!(results, vec![true, true]);
}

#[test]
fn test_cleanup_semantic_keeps_both_texts() {
    let engine = engine();
    let old = "mouse trap\nThe cat sat on the mat.";
    let new = "house trip\nA cat sat upon a hat.";
    let diffs = engine.cleanup_semantic(engine.diff_main(old, new, false));
    assert_eq!(text1(&diffs), old);
    assert_eq!(text2(&diffs), new);
    assert!(diffs.windows(2).all(|w| w[0].op != w[1].op));
}

#[test]
fn test_unified_apply_after_edit_elsewhere() {
    let engine = engine();
    let old = "fn main() {\n    let x = 1;\n    println!(\"{x}\");\n}\n";
    let new = "fn main() {\n    let x = 2;\n    println!(\"{x}\");\n}\n";
    let patch = engine.unified_make(old, new);
    assert_eq!(patch.hunks.len(), 1);
    assert!(patch
        .hunks[0]
        .lines
        .iter()
        .any(|line| line.op == Operation::Insert && line.text == "    let x = 2;"));

    let target = format!("// header\n// added later\n{old}");
    assert_eq!(
        engine.unified_apply(&patch, &target),
        (format!("// header\n// added later\n{new}"), vec![true])
    );
}
