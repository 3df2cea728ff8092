use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};

/// Tunable constants of the diff, match and patch engines.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub diff: DiffSettings,
    #[serde(default, rename = "match")]
    pub matching: MatchSettings,
    #[serde(default)]
    pub patch: PatchSettings,
    #[serde(default)]
    pub unified: UnifiedSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiffSettings {
    /// Seconds a diff may spend optimizing; `0` means no limit.
    pub timeout: f64,
    /// Cost of an empty edit in chars, used by efficiency cleanup.
    pub edit_cost: usize,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            timeout: 1.0,
            edit_cost: 4,
        }
    }
}

impl DiffSettings {
    /// Deadline for a diff starting now, if a timeout is configured.
    pub fn deadline(&self) -> Option<Instant> {
        if self.timeout > 0.0 {
            Some(Instant::now() + Duration::from_secs_f64(self.timeout))
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MatchSettings {
    /// 0.0 accepts only perfect matches, 1.0 accepts anything.
    pub threshold: f64,
    /// How far from the expected location a match may drift; a match this
    /// many chars away costs as much as a full mismatch. `0` requires the
    /// exact location.
    pub distance: usize,
    /// Longest pattern the bitap search handles.
    pub max_bits: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            distance: 1000,
            max_bits: 32,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PatchSettings {
    /// How closely the text under a large deletion must match the expected
    /// text before the deletion is applied.
    pub delete_threshold: f64,
    /// Chars of context kept on each side of a hunk.
    pub margin: usize,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            delete_threshold: 0.5,
            margin: 4,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UnifiedSettings {
    /// Context lines around each hunk when making line patches.
    pub context_lines: usize,
    /// Lines searched on each side of the expected hunk position.
    pub search_window: usize,
    /// Minimum mean line similarity for a fuzzy hunk location.
    pub line_similarity: f64,
}

impl Default for UnifiedSettings {
    fn default() -> Self {
        Self {
            context_lines: 3,
            search_window: 50,
            line_similarity: 0.8,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if !(self.diff.timeout >= 0.0 && self.diff.timeout.is_finite()) {
            issues.push(ValidationIssue::OutOfRange {
                field: "diff.timeout",
                message: format!("{} is not a non-negative number of seconds", self.diff.timeout),
            });
        }
        if self.diff.edit_cost == 0 {
            issues.push(ValidationIssue::OutOfRange {
                field: "diff.edit_cost",
                message: "must be at least 1".to_string(),
            });
        }

        for (field, value) in [
            ("match.threshold", self.matching.threshold),
            ("patch.delete_threshold", self.patch.delete_threshold),
            ("unified.line_similarity", self.unified.line_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ValidationIssue::OutOfRange {
                    field,
                    message: format!("{value} is outside 0.0..=1.0"),
                });
            }
        }

        if !(1..=64).contains(&self.matching.max_bits) {
            issues.push(ValidationIssue::OutOfRange {
                field: "match.max_bits",
                message: format!("{} is outside 1..=64", self.matching.max_bits),
            });
        }
        if self.patch.margin * 2 >= self.matching.max_bits {
            issues.push(ValidationIssue::InvalidCombo {
                message: format!(
                    "patch.margin {} leaves no room inside match.max_bits {}",
                    self.patch.margin, self.matching.max_bits
                ),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    OutOfRange {
        field: &'static str,
        message: String,
    },
    InvalidCombo {
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::OutOfRange { field, message } => {
                write!(f, "'{field}' out of range: {message}")
            }
            ValidationIssue::InvalidCombo { message } => {
                write!(f, "invalid engine configuration: {message}")
            }
        }
    }
}
