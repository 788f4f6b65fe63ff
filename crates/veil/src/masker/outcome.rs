//! Results of masking calls.

use serde::{Deserialize, Serialize};

use crate::ranges::Range;

/// A selected value that was not masked, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSelection {
    /// The value as the caller supplied it.
    pub value: String,
    /// Why it was skipped.
    pub reason: String,
}

impl SkippedSelection {
    pub(crate) fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// The rendered text of a masking call plus what happened along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskOutcome {
    /// The masked text.
    pub text: String,
    /// Replacements applied, ordered by start offset in the input.
    pub applied: Vec<Range>,
    /// Tokens minted and persisted by this call.
    pub minted: usize,
    /// Tokens whose anti-leakage retries ran out.
    pub exhausted: usize,
    /// Selections that could not be masked.
    pub skipped: Vec<SkippedSelection>,
}

impl MaskOutcome {
    /// An outcome that leaves `text` unchanged.
    pub(crate) fn unchanged(text: &str, skipped: Vec<SkippedSelection>) -> Self {
        Self {
            text: text.to_string(),
            skipped,
            ..Self::default()
        }
    }

    /// Whether anything was replaced.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        !self.applied.is_empty()
    }
}
