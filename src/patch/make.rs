//! Building patches from texts or diffs, and reshaping them for apply.

use super::Patch;
use crate::config::EngineConfig;
use crate::diff::{self, cleanup_efficiency, cleanup_semantic, Diff, Operation};
use crate::text::{find_chars, last_chars, rfind_chars, take_chars, to_string};

/// What a patch list is computed from.
#[derive(Debug, Clone, Copy)]
pub enum PatchInput<'a> {
    /// Source and target texts; the diff is computed with line mode.
    Texts(&'a str, &'a str),
    /// A diff list; the source text is reconstructed from it.
    Diffs(&'a [Diff]),
    /// Source text plus a diff list computed against it.
    TextDiffs(&'a str, &'a [Diff]),
}

/// Compute the hunks that turn the source text into the target text.
pub fn patch_make(input: PatchInput<'_>, config: &EngineConfig) -> Vec<Patch> {
    match input {
        PatchInput::Texts(text1, text2) => {
            let mut diffs = diff::diff_main(text1, text2, true, config.diff.deadline());
            if diffs.len() > 2 {
                diffs = cleanup_semantic(diffs);
                diffs = cleanup_efficiency(diffs, config.diff.edit_cost);
            }
            make_from_diffs(text1, &diffs, config)
        }
        PatchInput::Diffs(diffs) => make_from_diffs(&diff::text1(diffs), diffs, config),
        PatchInput::TextDiffs(text1, diffs) => make_from_diffs(text1, diffs, config),
    }
}

fn make_from_diffs(text1: &str, diffs: &[Diff], config: &EngineConfig) -> Vec<Patch> {
    let margin = config.patch.margin;
    let mut patches = Vec::new();
    let mut patch = Patch::default();
    let mut count1 = 0;
    let mut count2 = 0;

    // Context for each hunk comes from the text as it stands after the
    // previous hunks, so starts in the source and target stay consistent.
    let mut prepatch: Vec<char> = text1.chars().collect();
    let mut postpatch = prepatch.clone();

    for (idx, diff) in diffs.iter().enumerate() {
        let len = diff.len();
        if patch.diffs.is_empty() && diff.op != Operation::Equal {
            patch.start1 = count1;
            patch.start2 = count2;
        }

        match diff.op {
            Operation::Insert => {
                patch.diffs.push(diff.clone());
                patch.length2 += len;
                postpatch.splice(count2..count2, diff.text.chars());
            }
            Operation::Delete => {
                patch.length1 += len;
                patch.diffs.push(diff.clone());
                postpatch.drain(count2..count2 + len);
            }
            Operation::Equal => {
                if len <= 2 * margin && !patch.diffs.is_empty() && idx + 1 != diffs.len() {
                    // Short equality inside a hunk.
                    patch.diffs.push(diff.clone());
                    patch.length1 += len;
                    patch.length2 += len;
                } else if len >= 2 * margin && !patch.diffs.is_empty() {
                    add_context(&mut patch, &prepatch, config);
                    patches.push(std::mem::take(&mut patch));
                    prepatch.clone_from(&postpatch);
                    count1 = count2;
                }
            }
        }

        if diff.op != Operation::Insert {
            count1 += len;
        }
        if diff.op != Operation::Delete {
            count2 += len;
        }
    }

    if !patch.diffs.is_empty() {
        add_context(&mut patch, &prepatch, config);
        patches.push(patch);
    }
    patches
}

/// Grow the hunk's context until its source pattern is unique in `text`,
/// then add one more margin on each side.
pub(crate) fn add_context(patch: &mut Patch, text: &[char], config: &EngineConfig) {
    if text.is_empty() {
        return;
    }
    let margin = config.patch.margin;
    let max_pattern = config.matching.max_bits.saturating_sub(2 * margin);
    let window = |padding: usize| {
        let start = patch.start2.saturating_sub(padding).min(text.len());
        let end = (patch.start2 + patch.length1 + padding).min(text.len());
        &text[start..end.max(start)]
    };

    let mut padding = 0;
    let mut pattern = window(padding);
    while find_chars(text, pattern, 0) != rfind_chars(text, pattern, text.len())
        && pattern.len() < max_pattern
    {
        padding += margin;
        pattern = window(padding);
    }
    padding += margin;

    let prefix_start = patch.start2.saturating_sub(padding).min(text.len());
    let prefix = &text[prefix_start..patch.start2.min(text.len())];
    let suffix_start = (patch.start2 + patch.length1).min(text.len());
    let suffix_end = (suffix_start + padding).min(text.len());
    let suffix = &text[suffix_start..suffix_end];

    if !prefix.is_empty() {
        patch.diffs.insert(0, Diff::equal(to_string(prefix)));
    }
    if !suffix.is_empty() {
        patch.diffs.push(Diff::equal(to_string(suffix)));
    }
    patch.start1 = patch.start1.saturating_sub(prefix.len());
    patch.start2 -= prefix.len();
    patch.length1 += prefix.len() + suffix.len();
    patch.length2 += prefix.len() + suffix.len();
}

/// Surround the patch list with `margin` chars of padding so hunks at
/// either edge of the text have context to match against.
///
/// Returns the padding string, which the caller must also add to both
/// ends of the text the patches are applied to.
pub fn patch_add_padding(patches: &mut [Patch], margin: usize) -> String {
    let padding: String = (1..=margin as u32).filter_map(char::from_u32).collect();
    for patch in patches.iter_mut() {
        patch.start1 += margin;
        patch.start2 += margin;
    }

    if let Some(first) = patches.first_mut() {
        match first.diffs.first_mut() {
            Some(head) if head.op == Operation::Equal => {
                let head_len = head.len();
                if margin > head_len {
                    let extra = margin - head_len;
                    head.text = format!("{}{}", last_chars(&padding, extra), head.text);
                    first.start1 -= extra;
                    first.start2 -= extra;
                    first.length1 += extra;
                    first.length2 += extra;
                }
            }
            _ => {
                first.diffs.insert(0, Diff::equal(padding.clone()));
                first.start1 -= margin;
                first.start2 -= margin;
                first.length1 += margin;
                first.length2 += margin;
            }
        }
    }

    if let Some(last) = patches.last_mut() {
        match last.diffs.last_mut() {
            Some(tail) if tail.op == Operation::Equal => {
                let tail_len = tail.len();
                if margin > tail_len {
                    let extra = margin - tail_len;
                    tail.text.push_str(take_chars(&padding, extra));
                    last.length1 += extra;
                    last.length2 += extra;
                }
            }
            _ => {
                last.diffs.push(Diff::equal(padding.clone()));
                last.length1 += margin;
                last.length2 += margin;
            }
        }
    }

    padding
}

/// Break up hunks whose source side is longer than the matcher can handle.
pub fn patch_split_max(patches: &mut Vec<Patch>, config: &EngineConfig) {
    let indexed = std::mem::take(patches).into_iter().enumerate().collect();
    *patches = split_max_indexed(indexed, config)
        .into_iter()
        .map(|(_, patch)| patch)
        .collect();
}

/// [`patch_split_max`] that remembers which input patch each piece came
/// from.
pub(crate) fn split_max_indexed(
    patches: Vec<(usize, Patch)>,
    config: &EngineConfig,
) -> Vec<(usize, Patch)> {
    let patch_size = config.matching.max_bits;
    let margin = config.patch.margin;
    let mut out = Vec::with_capacity(patches.len());

    for (origin, big) in patches {
        if big.length1 <= patch_size {
            out.push((origin, big));
            continue;
        }

        let mut start1 = big.start1;
        let mut start2 = big.start2;
        let mut remaining = big.diffs;
        remaining.reverse();
        let mut precontext = String::new();

        while !remaining.is_empty() {
            let pre_len = precontext.chars().count();
            let mut piece = Patch {
                start1: start1.saturating_sub(pre_len),
                start2: start2.saturating_sub(pre_len),
                ..Patch::default()
            };
            let mut empty = true;
            if !precontext.is_empty() {
                piece.length1 = pre_len;
                piece.length2 = pre_len;
                piece.diffs.push(Diff::equal(precontext.clone()));
            }

            // At least one char per piece, so a margin that leaves no room
            // still makes progress.
            let limit = patch_size.saturating_sub(margin).max(piece.length1 + 1);
            while piece.length1 < limit {
                let Some(next) = remaining.last_mut() else {
                    break;
                };
                let next_len = next.len();
                if next.op == Operation::Insert {
                    piece.length2 += next_len;
                    start2 += next_len;
                    empty = false;
                    if let Some(diff) = remaining.pop() {
                        piece.diffs.push(diff);
                    }
                } else if next.op == Operation::Delete
                    && piece.diffs.len() == 1
                    && piece.diffs[0].op == Operation::Equal
                    && next_len > 2 * patch_size
                {
                    // A large deletion goes through in one piece.
                    piece.length1 += next_len;
                    start1 += next_len;
                    empty = false;
                    if let Some(diff) = remaining.pop() {
                        piece.diffs.push(diff);
                    }
                } else {
                    // Take only as much of a deletion or equality as fits.
                    let room = limit - piece.length1;
                    let taken = take_chars(&next.text, room).to_string();
                    let taken_len = taken.chars().count();
                    piece.length1 += taken_len;
                    start1 += taken_len;
                    if next.op == Operation::Equal {
                        piece.length2 += taken_len;
                        start2 += taken_len;
                    } else {
                        empty = false;
                    }
                    let op = next.op;
                    if taken_len == next_len {
                        remaining.pop();
                    } else {
                        next.text = next.text[taken.len()..].to_string();
                    }
                    piece.diffs.push(Diff::new(op, taken));
                }
            }

            precontext = last_chars(&diff::text2(&piece.diffs), margin).to_string();

            let rest: Vec<Diff> = remaining.iter().rev().cloned().collect();
            let postcontext = take_chars(&diff::text1(&rest), margin).to_string();
            if !postcontext.is_empty() {
                let post_len = postcontext.chars().count();
                piece.length1 += post_len;
                piece.length2 += post_len;
                match piece.diffs.last_mut() {
                    Some(tail) if tail.op == Operation::Equal => tail.text.push_str(&postcontext),
                    _ => piece.diffs.push(Diff::equal(postcontext)),
                }
            }

            if !empty {
                out.push((origin, piece));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{patch_from_text, patch_to_text};

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.diff.timeout = 0.0;
        config
    }

    fn make_text(text1: &str, text2: &str) -> String {
        patch_to_text(&patch_make(PatchInput::Texts(text1, text2), &config()))
    }

    #[test]
    fn test_make_null_case() {
        assert_eq!(make_text("", ""), "");
    }

    #[test]
    fn test_make_fox() {
        let text1 = "The quick brown fox jumps over the lazy dog.";
        let text2 = "That quick brown fox jumped over a lazy dog.";

        // Context of the second hunk is taken from the already patched text.
        assert_eq!(
            make_text(text2, text1),
            "@@ -1,8 +1,7 @@\n Th\n-at\n+e\n  qui\n@@ -21,17 +21,18 @@\n jump\n-ed\n+s\n  over \n-a\n+the\n  laz\n"
        );

        let expected = "@@ -1,11 +1,12 @@\n Th\n-e\n+at\n  quick b\n@@ -22,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n  laz\n";
        assert_eq!(make_text(text1, text2), expected);

        let diffs = vec![
            Diff::equal("Th"),
            Diff::delete("e"),
            Diff::insert("at"),
            Diff::equal(" quick brown fox jump"),
            Diff::delete("s"),
            Diff::insert("ed"),
            Diff::equal(" over "),
            Diff::delete("the"),
            Diff::insert("a"),
            Diff::equal(" lazy dog."),
        ];
        let from_diffs = patch_make(PatchInput::Diffs(&diffs), &config());
        assert_eq!(patch_to_text(&from_diffs), expected);
        let from_text_diffs = patch_make(PatchInput::TextDiffs(text1, &diffs), &config());
        assert_eq!(patch_to_text(&from_text_diffs), expected);
    }

    #[test]
    fn test_make_escapes_body() {
        assert_eq!(
            make_text(
                "`1234567890-=[]\\;',./",
                "~!@#$%^&*()_+{}|:\"<>?"
            ),
            "@@ -1,21 +1,21 @@\n-%601234567890-=%5B%5D%5C;',./\n+~!@#$%25%5E&*()_+%7B%7D%7C:%22%3C%3E?\n"
        );
    }

    #[test]
    fn test_make_long_string_with_repeats() {
        let text1 = "abcdef".repeat(100);
        let text2 = format!("{text1}123");
        assert_eq!(
            make_text(&text1, &text2),
            "@@ -573,28 +573,31 @@\n cdefabcdefabcdefabcdefabcdef\n+123\n"
        );
    }

    fn context_of(patch_text: &str, text: &str) -> String {
        let text: Vec<char> = text.chars().collect();
        let mut patch = patch_from_text(patch_text).unwrap().remove(0);
        add_context(&mut patch, &text, &config());
        patch.to_string()
    }

    #[test]
    fn test_add_context() {
        assert_eq!(
            context_of(
                "@@ -21,4 +21,10 @@\n-jump\n+somersault\n",
                "The quick brown fox jumps over the lazy dog."
            ),
            "@@ -17,12 +17,18 @@\n fox \n-jump\n+somersault\n s ov\n"
        );
    }

    #[test]
    fn test_add_context_clipped_at_text_edges() {
        assert_eq!(
            context_of(
                "@@ -21,4 +21,10 @@\n-jump\n+somersault\n",
                "The quick brown fox jumps."
            ),
            "@@ -17,10 +17,16 @@\n fox \n-jump\n+somersault\n s.\n"
        );
        assert_eq!(
            context_of("@@ -3 +3,2 @@\n-e\n+at\n", "The quick brown fox jumps."),
            "@@ -1,7 +1,8 @@\n Th\n-e\n+at\n  qui\n"
        );
    }

    #[test]
    fn test_add_context_grows_until_unique() {
        assert_eq!(
            context_of(
                "@@ -3 +3,2 @@\n-e\n+at\n",
                "The quick brown fox jumps.  The quick brown fox crashes."
            ),
            "@@ -1,27 +1,28 @@\n Th\n-e\n+at\n  quick brown fox jumps. \n"
        );
    }

    #[test]
    fn test_add_padding_both_edges() {
        let mut patches = patch_make(PatchInput::Texts("", "test"), &config());
        assert_eq!(patch_to_text(&patches), "@@ -0,0 +1,4 @@\n+test\n");
        patch_add_padding(&mut patches, 4);
        assert_eq!(
            patch_to_text(&patches),
            "@@ -1,8 +1,12 @@\n %01%02%03%04\n+test\n %01%02%03%04\n"
        );
    }

    #[test]
    fn test_add_padding_partial_edges() {
        let mut patches = patch_make(PatchInput::Texts("XY", "XtestY"), &config());
        assert_eq!(patch_to_text(&patches), "@@ -1,2 +1,6 @@\n X\n+test\n Y\n");
        patch_add_padding(&mut patches, 4);
        assert_eq!(
            patch_to_text(&patches),
            "@@ -2,8 +2,12 @@\n %02%03%04X\n+test\n Y%01%02%03\n"
        );
    }

    #[test]
    fn test_add_padding_no_edges() {
        let mut patches = patch_make(PatchInput::Texts("XXXXYYYY", "XXXXtestYYYY"), &config());
        assert_eq!(
            patch_to_text(&patches),
            "@@ -1,8 +1,12 @@\n XXXX\n+test\n YYYY\n"
        );
        patch_add_padding(&mut patches, 4);
        assert_eq!(
            patch_to_text(&patches),
            "@@ -5,8 +5,12 @@\n XXXX\n+test\n YYYY\n"
        );
    }

    #[test]
    fn test_split_max() {
        let cfg = config();
        let mut patches = patch_make(
            PatchInput::Texts(
                "abcdefghijklmnopqrstuvwxyz01234567890",
                "XabXcdXefXghXijXklXmnXopXqrXstXuvXwxXyzX01X23X45X67X89X0",
            ),
            &cfg,
        );
        patch_split_max(&mut patches, &cfg);
        assert_eq!(
            patch_to_text(&patches),
            "@@ -1,32 +1,46 @@\n+X\n ab\n+X\n cd\n+X\n ef\n+X\n gh\n+X\n ij\n+X\n kl\n+X\n mn\n+X\n op\n+X\n qr\n+X\n st\n+X\n uv\n+X\n wx\n+X\n yz\n+X\n 012345\n@@ -25,13 +39,18 @@\n zX01\n+X\n 23\n+X\n 45\n+X\n 67\n+X\n 89\n+X\n 0\n"
        );

        let mut patches = patch_make(
            PatchInput::Texts(
                "abcdef1234567890123456789012345678901234567890123456789012345678901234567890uvwxyz",
                "abcdefuvwxyz",
            ),
            &cfg,
        );
        let before = patch_to_text(&patches);
        patch_split_max(&mut patches, &cfg);
        assert_eq!(patch_to_text(&patches), before);

        let mut patches = patch_make(
            PatchInput::Texts(
                "1234567890123456789012345678901234567890123456789012345678901234567890",
                "abc",
            ),
            &cfg,
        );
        patch_split_max(&mut patches, &cfg);
        assert_eq!(
            patch_to_text(&patches),
            "@@ -1,32 +1,4 @@\n-1234567890123456789012345678\n 9012\n@@ -29,32 +1,4 @@\n-9012345678901234567890123456\n 7890\n@@ -57,14 +1,3 @@\n-78901234567890\n+abc\n"
        );

        let mut patches = patch_make(
            PatchInput::Texts(
                "abcdefghij , h : 0 , t : 1 abcdefghij , h : 0 , t : 1 abcdefghij , h : 0 , t : 1",
                "abcdefghij , h : 1 , t : 1 abcdefghij , h : 1 , t : 1 abcdefghij , h : 0 , t : 1",
            ),
            &cfg,
        );
        patch_split_max(&mut patches, &cfg);
        assert_eq!(
            patch_to_text(&patches),
            "@@ -2,32 +2,32 @@\n bcdefghij , h : \n-0\n+1\n  , t : 1 abcdef\n@@ -29,32 +29,32 @@\n bcdefghij , h : \n-0\n+1\n  , t : 1 abcdef\n"
        );
    }

    #[test]
    fn test_make_keeps_equality_of_twice_margin_inside_hunk() {
        let diffs = vec![
            Diff::delete("X"),
            Diff::equal("abcdefgh"),
            Diff::delete("Y"),
            Diff::equal("tail-tail-tail"),
        ];
        let patches = patch_make(PatchInput::Diffs(&diffs), &config());
        assert_eq!(
            patch_to_text(&patches),
            "@@ -1,14 +1,12 @@\n-X\n abcdefgh\n-Y\n tail\n"
        );
    }

    #[test]
    fn test_split_max_with_margin_wider_than_pattern() {
        let mut cfg = config();
        cfg.patch.margin = 40;
        let mut patches = patch_make(
            PatchInput::Texts(
                "1234567890123456789012345678901234567890123456789012345678901234567890",
                "abc",
            ),
            &cfg,
        );
        patch_split_max(&mut patches, &cfg);
        assert!(!patches.is_empty());
        let deleted: usize = patches
            .iter()
            .flat_map(|p| &p.diffs)
            .filter(|d| d.op == Operation::Delete)
            .map(Diff::len)
            .sum();
        assert_eq!(deleted, 70);
    }

    #[test]
    fn test_split_max_tracks_origin() {
        let cfg = config();
        let small = patch_make(PatchInput::Texts("XXXXYYYY", "XXXXtestYYYY"), &cfg);
        let big = patch_make(
            PatchInput::Texts(
                "1234567890123456789012345678901234567890123456789012345678901234567890",
                "abc",
            ),
            &cfg,
        );
        let indexed = vec![(0, small[0].clone()), (1, big[0].clone())];
        let origins: Vec<usize> = split_max_indexed(indexed, &cfg)
            .into_iter()
            .map(|(origin, _)| origin)
            .collect();
        assert_eq!(origins, vec![0, 1, 1, 1]);
    }
}
