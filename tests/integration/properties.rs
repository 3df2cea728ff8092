//! Properties that hold for arbitrary input text.

use proptest::prelude::*;
use textpatch::diff::{text1, text2};
use textpatch::{
    cleanup_efficiency, cleanup_semantic, diff_main, patch_from_text, patch_to_text, Diff, Engine,
    EngineConfig, PatchInput,
};

fn engine() -> Engine {
    let mut config = EngineConfig::default();
    config.diff.timeout = 0.0;
    Engine::new(config)
}

/// Small alphabet so texts share plenty of structure, plus a multibyte char.
fn text() -> impl Strategy<Value = String> {
    "[ab cé\n]{0,60}"
}

fn lines() -> impl Strategy<Value = String> {
    prop::collection::vec("[ab]{0,3}", 1..12).prop_map(|lines| {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    })
}

proptest! {
    #[test]
    fn diff_reconstructs_both_texts(a in text(), b in text()) {
        let diffs = diff_main(&a, &b, false, None);
        prop_assert_eq!(text1(&diffs), a.clone());
        prop_assert_eq!(text2(&diffs), b.clone());
        prop_assert!(diffs.iter().all(|d| !d.is_empty()));

        let diffs = diff_main(&a, &b, true, None);
        prop_assert_eq!(text1(&diffs), a);
        prop_assert_eq!(text2(&diffs), b);
    }

    #[test]
    fn diff_of_identical_texts_is_one_equality(a in text()) {
        let expected = if a.is_empty() { Vec::new() } else { vec![Diff::equal(a.clone())] };
        prop_assert_eq!(diff_main(&a, &a, false, None), expected);
    }

    #[test]
    fn cleanups_preserve_texts(a in text(), b in text()) {
        let diffs = diff_main(&a, &b, false, None);

        let semantic = cleanup_semantic(diffs.clone());
        prop_assert_eq!(text1(&semantic), a.clone());
        prop_assert_eq!(text2(&semantic), b.clone());

        let efficient = cleanup_efficiency(diffs, 4);
        prop_assert_eq!(text1(&efficient), a);
        prop_assert_eq!(text2(&efficient), b);
    }

    #[test]
    fn patch_text_round_trips(a in text(), b in text()) {
        let patches = engine().patch_make(PatchInput::Texts(&a, &b));
        let parsed = patch_from_text(&patch_to_text(&patches)).unwrap();
        prop_assert_eq!(parsed, patches);
    }

    #[test]
    fn apply_after_make_restores_target(a in text(), b in text()) {
        let engine = engine();
        let patches = engine.patch_make(PatchInput::Texts(&a, &b));
        let (patched, results) = engine.patch_apply(&patches, &a);
        prop_assert_eq!(patched, b);
        prop_assert!(results.iter().all(|ok| *ok));
        prop_assert_eq!(results.len(), patches.len());
    }

    #[test]
    fn apply_to_unrelated_text_reports_every_patch(
        a in "[abc é\n]{0,120}",
        b in "[abc é\n]{0,120}",
        c in "[abc é\n]{0,120}",
    ) {
        let engine = engine();
        let patches = engine.patch_make(PatchInput::Texts(&a, &b));
        let (_, results) = engine.patch_apply(&patches, &c);
        prop_assert_eq!(results.len(), patches.len());
    }

    #[test]
    fn unified_apply_after_make_restores_target(a in lines(), b in lines()) {
        let engine = engine();
        let patch = engine.unified_make(&a, &b);
        let reparsed = textpatch::UnifiedPatch::parse(&patch.to_text()).unwrap();
        let (patched, results) = engine.unified_apply(&reparsed, &a);
        prop_assert_eq!(patched, b);
        prop_assert!(results.iter().all(|ok| *ok));
    }
}
