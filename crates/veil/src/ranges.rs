//! Overlap resolution and right-to-left substitution.
//!
//! Candidate spans come from several producers (the identifier walker, the
//! pattern detector, caller selections) and frequently overlap: a UUID inside
//! a URL, a word inside an email. [`resolve`] keeps a maximal non-overlapping
//! subset that prefers longer spans, and [`apply`] rewrites the text from the
//! right so earlier offsets stay valid.
//!
//! Offsets are byte offsets into the subject string.

use serde::{Deserialize, Serialize};

/// A half-open byte interval plus the text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Replacement text.
    pub replacement: String,
}

impl Range {
    /// Create a new range.
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    /// Length of the replaced span.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span is empty or inverted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether the two spans share at least one byte.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the span can be applied to `text`.
    fn fits(&self, text: &str) -> bool {
        !self.is_empty()
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }
}

/// Select a maximal non-overlapping subset of `ranges` for `text`.
///
/// Empty, inverted, out-of-bounds and mid-character ranges are dropped.
/// The rest are considered longest first, leftmost first among equal
/// lengths, and accepted unless they overlap an already accepted span.
/// The result is ordered by start offset.
#[must_use]
pub fn resolve(text: &str, ranges: Vec<Range>) -> Vec<Range> {
    let mut candidates: Vec<Range> = ranges.into_iter().filter(|r| r.fits(text)).collect();
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then(a.start.cmp(&b.start)));

    let mut accepted: Vec<Range> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if accepted.iter().all(|kept| !kept.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|r| r.start);
    accepted
}

/// Substitute already resolved ranges into `text`, right to left.
///
/// Ranges that do not fit the text are skipped. Overlapping input is not
/// repaired here; run [`resolve`] first.
#[must_use]
pub fn apply(text: &str, ranges: &[Range]) -> String {
    let mut ordered: Vec<&Range> = ranges.iter().filter(|r| r.fits(text)).collect();
    if ordered.is_empty() {
        return text.to_string();
    }
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut out = text.to_string();
    let mut floor = usize::MAX;
    for range in ordered {
        // Skip anything reaching into a span we already rewrote.
        if range.end > floor {
            continue;
        }
        out.replace_range(range.start..range.end, &range.replacement);
        floor = range.start;
    }
    out
}

/// Resolve and apply in one step, returning the text and the accepted ranges.
#[must_use]
pub fn rewrite(text: &str, ranges: Vec<Range>) -> (String, Vec<Range>) {
    let accepted = resolve(text, ranges);
    let rendered = apply(text, &accepted);
    (rendered, accepted)
}
