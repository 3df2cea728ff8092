//! Textpatch: diff, patch and fuzzy patch application for plain text
//!
//! Computes minimal edit scripts between two texts, serializes them as
//! compact relocatable patches, and re-applies those patches to text that
//! may have changed in the meantime.
//!
//! # Architecture
//!
//! - [`diff`]: Myers diff with half-match and line-mode speedups, plus
//!   cleanup passes that trade minimality for readability or efficiency.
//! - [`matcher`]: bitap fuzzy search used to relocate hunks.
//! - [`patch`]: char-level hunks with context, their text format, and
//!   fuzzy application with a success flag per patch.
//! - [`unified`]: line-level unified diffs (`diff -u`) with the same
//!   make / parse / apply cycle.
//! - [`Engine`]: all of the above bound to one [`EngineConfig`].
//!
//! All positions and lengths count Unicode scalar values.
//!
//! # Example
//!
//! ```
//! use textpatch::{patch_from_text, patch_to_text, Engine, PatchInput};
//!
//! let engine = Engine::default();
//! let old = "The quick brown fox jumps over the lazy dog.";
//! let new = "That quick brown fox jumped over a lazy dog.";
//!
//! let text = patch_to_text(&engine.patch_make(PatchInput::Texts(old, new)));
//! let patches = patch_from_text(&text).unwrap();
//!
//! let (patched, results) = engine.patch_apply(&patches, old);
//! assert_eq!(patched, new);
//! assert!(results.iter().all(|ok| *ok));
//! ```

pub mod codec;
pub mod config;
pub mod diff;
pub mod edit;
pub mod engine;
pub mod matcher;
pub mod patch;
pub mod text;
pub mod unified;

// Re-exports
pub use config::{
    load_from_path, load_from_str, load_or_default, ConfigError, EngineConfig, ValidationError,
};
pub use diff::{
    cleanup_efficiency, cleanup_merge, cleanup_semantic, cleanup_semantic_lossless, diff_main,
    from_delta, levenshtein, to_delta, x_index, DeltaError, Diff, Operation,
};
pub use edit::{ContentCheck, EditError, EditResult, FileEdit};
pub use engine::Engine;
pub use matcher::{match_main, MatchError};
pub use patch::{
    patch_add_padding, patch_apply, patch_from_text, patch_make, patch_split_max, patch_to_text,
    FormatError, Patch, PatchInput,
};
pub use text::{common_overlap, common_prefix, common_suffix};
pub use unified::{LineHunk, UnifiedPatch};
