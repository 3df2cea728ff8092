//! Post-processing passes over a diff list.
//!
//! Each pass takes ownership of a diff list and returns the rewritten list;
//! source and target reconstruction is preserved by every pass.

use super::{Diff, Operation};
use crate::text::{
    char_len, common_overlap, common_prefix, common_suffix, last_chars, skip_chars, take_chars,
};

/// Merge adjacent fragments of the same kind, factor shared text out of
/// delete/insert pairs, and slide single edits over their neighbours where
/// that removes an equality.
pub fn cleanup_merge(mut diffs: Vec<Diff>) -> Vec<Diff> {
    loop {
        merge_runs(&mut diffs);
        if !shift_single_edits(&mut diffs) {
            return diffs;
        }
    }
}

fn merge_runs(diffs: &mut Vec<Diff>) {
    // Sentinel so the last run is flushed inside the loop.
    diffs.push(Diff::equal(""));
    let mut pointer = 0;
    let mut count_delete = 0;
    let mut count_insert = 0;
    let mut text_delete = String::new();
    let mut text_insert = String::new();

    while pointer < diffs.len() {
        match diffs[pointer].op {
            Operation::Insert => {
                count_insert += 1;
                text_insert.push_str(&diffs[pointer].text);
                pointer += 1;
            }
            Operation::Delete => {
                count_delete += 1;
                text_delete.push_str(&diffs[pointer].text);
                pointer += 1;
            }
            Operation::Equal => {
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let prefix = common_prefix(&text_insert, &text_delete);
                        if prefix != 0 {
                            let shared = take_chars(&text_insert, prefix).to_string();
                            let run_start = pointer - count_delete - count_insert;
                            if run_start > 0 && diffs[run_start - 1].op == Operation::Equal {
                                diffs[run_start - 1].text.push_str(&shared);
                            } else {
                                diffs.insert(0, Diff::equal(shared));
                                pointer += 1;
                            }
                            text_insert = skip_chars(&text_insert, prefix).to_string();
                            text_delete = skip_chars(&text_delete, prefix).to_string();
                        }

                        let suffix = common_suffix(&text_insert, &text_delete);
                        if suffix != 0 {
                            let shared = last_chars(&text_insert, suffix).to_string();
                            diffs[pointer].text.insert_str(0, &shared);
                            text_insert.truncate(text_insert.len() - shared.len());
                            text_delete.truncate(text_delete.len() - shared.len());
                        }
                    }

                    let run_start = pointer - count_delete - count_insert;
                    diffs.drain(run_start..pointer);
                    pointer = run_start;
                    if !text_delete.is_empty() {
                        diffs.insert(pointer, Diff::delete(std::mem::take(&mut text_delete)));
                        pointer += 1;
                    }
                    if !text_insert.is_empty() {
                        diffs.insert(pointer, Diff::insert(std::mem::take(&mut text_insert)));
                        pointer += 1;
                    }
                    pointer += 1;
                } else if pointer != 0 && diffs[pointer - 1].op == Operation::Equal {
                    let text = diffs.remove(pointer).text;
                    diffs[pointer - 1].text.push_str(&text);
                } else {
                    pointer += 1;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }

    if diffs.last().is_some_and(|d| d.text.is_empty()) {
        diffs.pop();
    }
}

/// `A<ins>BA</ins>C` becomes `<ins>AB</ins>AC`, and the mirror image.
/// Returns whether anything moved.
fn shift_single_edits(diffs: &mut Vec<Diff>) -> bool {
    let mut changes = false;
    let mut pointer = 1;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Operation::Equal && diffs[pointer + 1].op == Operation::Equal
        {
            let prev = diffs[pointer - 1].text.clone();
            let next = diffs[pointer + 1].text.clone();
            if diffs[pointer].text.ends_with(&prev) {
                let cur = &diffs[pointer].text;
                let moved = format!("{}{}", prev, &cur[..cur.len() - prev.len()]);
                diffs[pointer].text = moved;
                diffs[pointer + 1].text.insert_str(0, &prev);
                diffs.remove(pointer - 1);
                changes = true;
            } else if diffs[pointer].text.starts_with(&next) {
                diffs[pointer - 1].text.push_str(&next);
                let cur = &diffs[pointer].text;
                let moved = format!("{}{}", &cur[next.len()..], next);
                diffs[pointer].text = moved;
                diffs.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }
    changes
}

/// Remove equalities that are semantically trivial: short runs squeezed
/// between larger edits. Afterwards boundaries are aligned to words and
/// lines, and overlaps between neighbouring deletions and insertions are
/// pulled out as equalities.
pub fn cleanup_semantic(mut diffs: Vec<Diff>) -> Vec<Diff> {
    let mut changes = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<String> = None;
    let mut pointer: isize = 0;
    // Edit sizes before and after the last equality.
    let mut insertions1 = 0;
    let mut deletions1 = 0;
    let mut insertions2 = 0;
    let mut deletions2 = 0;

    while (pointer as usize) < diffs.len() {
        let idx = pointer as usize;
        if diffs[idx].op == Operation::Equal {
            equalities.push(idx);
            insertions1 = insertions2;
            deletions1 = deletions2;
            insertions2 = 0;
            deletions2 = 0;
            last_equality = Some(diffs[idx].text.clone());
        } else {
            if diffs[idx].op == Operation::Insert {
                insertions2 += diffs[idx].len();
            } else {
                deletions2 += diffs[idx].len();
            }
            let trivial = last_equality.as_ref().is_some_and(|eq| {
                let len = char_len(eq);
                !eq.is_empty()
                    && len <= insertions1.max(deletions1)
                    && len <= insertions2.max(deletions2)
            });
            if let (true, Some(&at)) = (trivial, equalities.last()) {
                let equality = last_equality.take().unwrap_or_default();
                diffs.insert(at, Diff::delete(equality));
                diffs[at + 1].op = Operation::Insert;
                equalities.pop();
                // The previous equality needs re-evaluating as well.
                equalities.pop();
                pointer = equalities.last().map(|&i| i as isize).unwrap_or(-1);
                insertions1 = 0;
                deletions1 = 0;
                insertions2 = 0;
                deletions2 = 0;
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes {
        diffs = cleanup_merge(diffs);
    }
    let mut diffs = cleanup_semantic_lossless(diffs);
    extract_overlaps(&mut diffs);
    diffs
}

/// `<del>abcxxx</del><ins>xxxdef</ins>` becomes
/// `<del>abc</del>xxx<ins>def</ins>` when the overlap is at least half of
/// either side. The reverse overlap swaps the order of the edits.
fn extract_overlaps(diffs: &mut Vec<Diff>) {
    let mut pointer = 1;
    while pointer < diffs.len() {
        if diffs[pointer - 1].op == Operation::Delete && diffs[pointer].op == Operation::Insert {
            let deletion = diffs[pointer - 1].text.clone();
            let insertion = diffs[pointer].text.clone();
            let del_len = char_len(&deletion) as f64;
            let ins_len = char_len(&insertion) as f64;
            let forward = common_overlap(&deletion, &insertion);
            let backward = common_overlap(&insertion, &deletion);
            if forward >= backward {
                let overlap = forward as f64;
                if forward > 0 && (overlap >= del_len / 2.0 || overlap >= ins_len / 2.0) {
                    let shared = take_chars(&insertion, forward);
                    diffs.insert(pointer, Diff::equal(shared));
                    diffs[pointer - 1].text =
                        take_chars(&deletion, char_len(&deletion) - forward).to_string();
                    diffs[pointer + 1].text = skip_chars(&insertion, forward).to_string();
                    pointer += 1;
                }
            } else {
                let overlap = backward as f64;
                if overlap >= del_len / 2.0 || overlap >= ins_len / 2.0 {
                    let shared = take_chars(&deletion, backward);
                    diffs.insert(pointer, Diff::equal(shared));
                    diffs[pointer - 1] =
                        Diff::insert(take_chars(&insertion, char_len(&insertion) - backward));
                    diffs[pointer + 1] = Diff::delete(skip_chars(&deletion, backward));
                    pointer += 1;
                }
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Slide single edits surrounded by equalities sideways so their edges
/// fall on the most natural boundary (blank line, line, sentence, word).
pub fn cleanup_semantic_lossless(mut diffs: Vec<Diff>) -> Vec<Diff> {
    let mut pointer: isize = 1;
    while pointer >= 1 && (pointer as usize) + 1 < diffs.len() {
        let idx = pointer as usize;
        if diffs[idx - 1].op == Operation::Equal && diffs[idx + 1].op == Operation::Equal {
            let mut equality1 = diffs[idx - 1].text.clone();
            let mut edit = diffs[idx].text.clone();
            let mut equality2 = diffs[idx + 1].text.clone();

            // Start from the leftmost position the edit can take.
            let shift = common_suffix(&equality1, &edit);
            if shift > 0 {
                let common = last_chars(&edit, shift).to_string();
                equality1.truncate(equality1.len() - common.len());
                edit = format!("{}{}", common, &edit[..edit.len() - common.len()]);
                equality2.insert_str(0, &common);
            }

            let mut best_equality1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_equality2 = equality2.clone();
            let mut best_score =
                semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
            while let (Some(a), Some(b)) = (edit.chars().next(), equality2.chars().next()) {
                if a != b {
                    break;
                }
                equality1.push(a);
                edit.remove(0);
                edit.push(a);
                equality2.remove(0);
                let score = semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
                // `>=` favours the rightmost of equally good positions.
                if score >= best_score {
                    best_score = score;
                    best_equality1 = equality1.clone();
                    best_edit = edit.clone();
                    best_equality2 = equality2.clone();
                }
            }

            if diffs[idx - 1].text != best_equality1 {
                let mut at = idx;
                if best_equality1.is_empty() {
                    diffs.remove(at - 1);
                    at -= 1;
                    pointer -= 1;
                } else {
                    diffs[at - 1].text = best_equality1;
                }
                diffs[at].text = best_edit;
                if best_equality2.is_empty() {
                    diffs.remove(at + 1);
                    pointer -= 1;
                } else {
                    diffs[at + 1].text = best_equality2;
                }
            }
        }
        pointer = pointer.max(0) + 1;
    }
    diffs
}

/// Score how well the boundary between `one` and `two` falls on a
/// logical break: 6 at text edges, down to 0 inside a word.
fn semantic_score(one: &str, two: &str) -> u8 {
    let (Some(char1), Some(char2)) = (one.chars().last(), two.chars().next()) else {
        return 6;
    };
    let non_alphanumeric1 = !char1.is_alphanumeric();
    let non_alphanumeric2 = !char2.is_alphanumeric();
    let whitespace1 = non_alphanumeric1 && char1.is_whitespace();
    let whitespace2 = non_alphanumeric2 && char2.is_whitespace();
    let line_break1 = whitespace1 && matches!(char1, '\r' | '\n');
    let line_break2 = whitespace2 && matches!(char2, '\r' | '\n');
    let blank_line1 = line_break1 && (one.ends_with("\n\n") || one.ends_with("\n\r\n"));
    let blank_line2 = line_break2
        && ["\n\n", "\n\r\n", "\r\n\n", "\r\n\r\n"]
            .iter()
            .any(|p| two.starts_with(p));

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alphanumeric1 && !whitespace1 && whitespace2 {
        // End of a sentence.
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alphanumeric1 || non_alphanumeric2 {
        1
    } else {
        0
    }
}

/// Fold short equalities into the surrounding edits when carrying them as
/// separate fragments costs more than `edit_cost` chars would.
pub fn cleanup_efficiency(mut diffs: Vec<Diff>, edit_cost: usize) -> Vec<Diff> {
    let mut changes = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<String> = None;
    let mut pointer: isize = 0;
    // Whether there is an insertion/deletion before/after the last equality.
    let mut pre_ins = false;
    let mut pre_del = false;
    let mut post_ins = false;
    let mut post_del = false;

    while (pointer as usize) < diffs.len() {
        let idx = pointer as usize;
        if diffs[idx].op == Operation::Equal {
            if diffs[idx].len() < edit_cost && (post_ins || post_del) {
                equalities.push(idx);
                pre_ins = post_ins;
                pre_del = post_del;
                last_equality = Some(diffs[idx].text.clone());
            } else {
                equalities.clear();
                last_equality = None;
            }
            post_ins = false;
            post_del = false;
        } else {
            if diffs[idx].op == Operation::Delete {
                post_del = true;
            } else {
                post_ins = true;
            }

            // Five shapes qualify:
            // <ins>A</ins><del>B</del>XY<ins>C</ins><del>D</del>
            // <ins>A</ins>X<ins>C</ins><del>D</del>
            // <ins>A</ins><del>B</del>X<ins>C</ins>
            // <del>A</del>X<ins>C</ins><del>D</del>
            // <ins>A</ins><del>B</del>X<del>C</del>
            let sides = [pre_ins, pre_del, post_ins, post_del]
                .iter()
                .filter(|&&b| b)
                .count();
            let qualifies = last_equality.as_ref().is_some_and(|eq| {
                (pre_ins && pre_del && post_ins && post_del)
                    || (2 * char_len(eq) < edit_cost && sides == 3)
            });
            if let (true, Some(&at)) = (qualifies, equalities.last()) {
                let equality = last_equality.take().unwrap_or_default();
                diffs.insert(at, Diff::delete(equality));
                diffs[at + 1].op = Operation::Insert;
                equalities.pop();
                if pre_ins && pre_del {
                    // No changes made which could affect previous entry.
                    post_ins = true;
                    post_del = true;
                    equalities.clear();
                } else {
                    equalities.pop();
                    pointer = equalities.last().map(|&i| i as isize).unwrap_or(-1);
                    post_ins = false;
                    post_del = false;
                }
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes {
        diffs = cleanup_merge(diffs);
    }
    diffs
}
