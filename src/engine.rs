use crate::config::EngineConfig;
use crate::diff::{self, Diff};
use crate::matcher::{self, MatchError};
use crate::patch::{self, Patch, PatchInput};
use crate::unified::UnifiedPatch;
use std::time::Instant;

/// Diff, match and patch operations bound to one configuration.
///
/// The engine holds no state besides its configuration, so it can be
/// cloned or shared across threads freely.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Diff two texts within the configured timeout.
    pub fn diff_main(&self, text1: &str, text2: &str, check_lines: bool) -> Vec<Diff> {
        self.diff_main_with_deadline(text1, text2, check_lines, self.config.diff.deadline())
    }

    pub fn diff_main_with_deadline(
        &self,
        text1: &str,
        text2: &str,
        check_lines: bool,
        deadline: Option<Instant>,
    ) -> Vec<Diff> {
        diff::diff_main(text1, text2, check_lines, deadline)
    }

    pub fn cleanup_semantic(&self, diffs: Vec<Diff>) -> Vec<Diff> {
        diff::cleanup_semantic(diffs)
    }

    /// Efficiency cleanup at the configured edit cost.
    pub fn cleanup_efficiency(&self, diffs: Vec<Diff>) -> Vec<Diff> {
        diff::cleanup_efficiency(diffs, self.config.diff.edit_cost)
    }

    pub fn match_main(
        &self,
        text: &str,
        pattern: &str,
        loc: usize,
    ) -> Result<Option<usize>, MatchError> {
        matcher::match_main(text, pattern, loc, &self.config.matching)
    }

    pub fn patch_make(&self, input: PatchInput<'_>) -> Vec<Patch> {
        patch::patch_make(input, &self.config)
    }

    pub fn patch_apply(&self, patches: &[Patch], text: &str) -> (String, Vec<bool>) {
        patch::patch_apply(patches, text, &self.config)
    }

    pub fn patch_add_padding(&self, patches: &mut [Patch]) -> String {
        patch::patch_add_padding(patches, self.config.patch.margin)
    }

    pub fn patch_split_max(&self, patches: &mut Vec<Patch>) {
        patch::patch_split_max(patches, &self.config)
    }

    pub fn unified_make(&self, old: &str, new: &str) -> UnifiedPatch {
        UnifiedPatch::make(old, new, self.config.unified.context_lines)
    }

    pub fn unified_apply(&self, patch: &UnifiedPatch, text: &str) -> (String, Vec<bool>) {
        patch.apply(text, &self.config.unified)
    }
}
