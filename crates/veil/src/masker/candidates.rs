//! Turning front-end inputs into candidate spans.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use veil_token::Category;

use super::outcome::SkippedSelection;
use crate::boundary::{Separation, find_standalone};
use crate::detect::{self, Detection, PatternDetector};
use crate::extract::{Extraction, LanguageConfig};
use crate::ranges::{self, Range};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Identifier pattern is a valid regex")
});

static BARE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("Bare run pattern is a valid regex"));

static JOINED_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_]+(?:[.+\-][A-Za-z0-9_]+)+").expect("Joined run pattern is a valid regex")
});

/// A span to replace and the value whose token replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub start: usize,
    pub end: usize,
    pub kind: Category,
    /// Value the token is derived from and stored under.
    pub original: String,
    /// Sigil re-attached in front of the token.
    pub prefix: Option<char>,
}

impl Candidate {
    fn new(start: usize, end: usize, kind: Category, original: impl Into<String>) -> Self {
        Self {
            start,
            end,
            kind,
            original: original.into(),
            prefix: None,
        }
    }

    pub(crate) fn replacement(&self, token: &str) -> String {
        match self.prefix {
            Some(sigil) => format!("{sigil}{token}"),
            None => token.to_string(),
        }
    }
}

/// Keep the candidates whose spans survive overlap resolution.
///
/// Resolving before any token is minted keeps suppressed spans (a UUID
/// inside a URL) out of the store.
pub(crate) fn settle(text: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let spans = candidates
        .iter()
        .map(|c| Range::new(c.start, c.end, String::new()))
        .collect();
    let accepted: HashSet<(usize, usize)> = ranges::resolve(text, spans)
        .into_iter()
        .map(|r| (r.start, r.end))
        .collect();

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| accepted.contains(&(c.start, c.end)) && seen.insert((c.start, c.end)))
        .collect()
}

/// Values already standing in `text` that a fresh token must not equal.
///
/// Word runs, runs joined by `.`, `+` or `-` (decimals, UUIDs, dashed
/// numbers) and every structured value the detector recognizes.
pub(crate) fn resident_values(text: &str) -> Vec<String> {
    let mut values: Vec<String> = BARE_RUN
        .find_iter(text)
        .chain(JOINED_RUN.find_iter(text))
        .map(|m| m.as_str().to_string())
        .collect();
    values.extend(PatternDetector::new().detect(text).into_iter().map(|d| d.text));
    values
}

/// Whether `token` stands alone in `text` outside every span in `replaced`.
///
/// Such an occurrence survives masking untouched and would be rewritten by
/// unmasking.
pub(crate) fn stands_outside(text: &str, token: &str, replaced: &[Range]) -> bool {
    find_standalone(text, token, true, Separation::Edges)
        .into_iter()
        .any(|(start, end)| !replaced.iter().any(|r| r.start < end && start < r.end))
}

/// Candidates for every identifier occurrence, stored under the group's
/// first-seen casing.
pub(crate) fn from_extraction(extraction: &Extraction, language: &LanguageConfig) -> Vec<Candidate> {
    extraction
        .groups
        .iter()
        .flat_map(|group| {
            group.occurrences.iter().map(move |occ| Candidate {
                start: occ.start,
                end: occ.end,
                kind: Category::Ident,
                original: group.name.clone(),
                prefix: if occ.prefixed {
                    language.variable_prefix()
                } else {
                    None
                },
            })
        })
        .collect()
}

/// Candidates for detector matches.
pub(crate) fn from_detections(detections: Vec<Detection>) -> Vec<Candidate> {
    detections
        .into_iter()
        .map(|d| Candidate::new(d.start, d.end, d.category, d.text))
        .collect()
}

/// Candidates for free-text words, matched on whole-word boundaries.
///
/// Each occurrence is stored under its own spelling so unmasking restores
/// the exact text even when matching ignores case.
pub(crate) fn from_words(
    text: &str,
    words: &[String],
    case_sensitive: bool,
    skipped: &mut Vec<SkippedSelection>,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for word in words {
        if word.trim().is_empty() {
            skipped.push(SkippedSelection::new(word, "empty selection"));
            continue;
        }
        if !seen.insert(word.as_str()) {
            continue;
        }
        let hits = find_standalone(text, word, case_sensitive, Separation::Word);
        if hits.is_empty() {
            skipped.push(SkippedSelection::new(word, "no whole-word occurrence"));
            continue;
        }
        out.extend(
            hits.into_iter()
                .map(|(start, end)| Candidate::new(start, end, Category::Word, &text[start..end])),
        );
    }
    out
}

/// Candidates for a mixed selection list.
///
/// - numeric literals become `NUM`, matched standalone;
/// - quoted literals are matched with their quotes, and only the inner value
///   is replaced, classified as email/URL/UUID/phone or else `WORD`;
/// - bare identifiers become `IDENT`, matched as whole words, case-sensitive;
/// - anything else is classified the same way and matched standalone.
pub(crate) fn from_selection(
    text: &str,
    selected: &[String],
    skipped: &mut Vec<SkippedSelection>,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for value in selected {
        if value.trim().is_empty() {
            skipped.push(SkippedSelection::new(value, "empty selection"));
            continue;
        }
        if !seen.insert(value.as_str()) {
            continue;
        }

        let found = if let Some(inner) = unquote(value) {
            quoted(text, value, inner)
        } else if detect::is_numeric(value) {
            Ok(standalone(text, value, Category::Num))
        } else if IDENTIFIER.is_match(value) {
            Ok(standalone(text, value, Category::Ident))
        } else {
            let kind = detect::classify(value).unwrap_or(Category::Word);
            Ok(standalone(text, value, kind))
        };

        match found {
            Ok(candidates) if candidates.is_empty() => {
                skipped.push(SkippedSelection::new(value, "not found in text"));
            }
            Ok(candidates) => out.extend(candidates),
            Err(reason) => skipped.push(SkippedSelection::new(value, reason)),
        }
    }
    out
}

fn standalone(text: &str, value: &str, kind: Category) -> Vec<Candidate> {
    find_standalone(text, value, true, Separation::Strict)
        .into_iter()
        .map(|(start, end)| Candidate::new(start, end, kind, value))
        .collect()
}

fn quoted(text: &str, literal: &str, inner: &str) -> Result<Vec<Candidate>, &'static str> {
    if inner.is_empty() {
        return Err("empty string literal");
    }
    let kind = detect::classify(inner).unwrap_or(Category::Word);
    let quote_len = literal.len() - inner.len();
    let open = quote_len / 2;

    Ok(text
        .match_indices(literal)
        .map(|(start, _)| {
            let value_start = start + open;
            Candidate::new(value_start, value_start + inner.len(), kind, inner)
        })
        .collect())
}

/// Strip one level of matching `'`, `"` or `` ` `` quotes.
fn unquote(value: &str) -> Option<&str> {
    let mut chars = value.chars();
    let open = chars.next()?;
    let close = chars.next_back()?;
    if open == close && matches!(open, '\'' | '"' | '`') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn selection_routes_by_shape() {
        let text = r#"x = 42; y = "a@b.io"; total = x"#;
        let mut skipped = Vec::new();
        let found = from_selection(text, &strings(&["42", "\"a@b.io\"", "total", "missing"]), &mut skipped);

        let kinds: Vec<_> = found.iter().map(|c| (c.kind, c.original.as_str())).collect();
        assert!(kinds.contains(&(Category::Num, "42")));
        assert!(kinds.contains(&(Category::Email, "a@b.io")));
        assert!(kinds.contains(&(Category::Ident, "total")));
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].value, "missing");

        let email = found.iter().find(|c| c.kind == Category::Email).unwrap();
        assert_eq!(&text[email.start..email.end], "a@b.io");
    }

    #[test]
    fn identifiers_match_case_sensitively() {
        let mut skipped = Vec::new();
        let found = from_selection("Total total", &strings(&["total"]), &mut skipped);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 6);
    }

    #[test]
    fn empty_literal_is_skipped_not_fatal() {
        let mut skipped = Vec::new();
        let found = from_selection("a '' b", &strings(&["''", "b"]), &mut skipped);
        assert_eq!(found.len(), 1);
        assert_eq!(skipped[0].reason, "empty string literal");
    }

    #[test]
    fn settle_drops_nested_spans() {
        let text = "https://x.io/123e4567-e89b-12d3-a456-426614174000";
        let detections = crate::detect::PatternDetector::new().detect(text);
        let kept = settle(text, from_detections(detections));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, Category::Url);
    }

    #[test]
    fn resident_values_cover_numbers_and_structured_values() {
        let text = "pi 3.17, id 123e4567-e89b-12d3-a456-426614174000, call (555) 123-4567";
        let values = resident_values(text);
        for expected in [
            "pi",
            "3",
            "17",
            "3.17",
            "123e4567-e89b-12d3-a456-426614174000",
            "(555) 123-4567",
        ] {
            assert!(values.iter().any(|v| v == expected), "{expected} missing");
        }
    }

    #[test]
    fn occurrences_inside_replaced_spans_do_not_count() {
        let text = "a = 42; b = 74";
        let replaced = [Range::new(4, 6, "74")];
        assert!(stands_outside(text, "74", &replaced));
        assert!(!stands_outside(text, "74", &[Range::new(12, 14, "9")]));
        assert!(!stands_outside("a = 3.74", "74", &[]));
    }

    #[test]
    fn prefixed_replacement() {
        let mut c = Candidate::new(0, 6, Category::Ident, "total");
        c.prefix = Some('$');
        assert_eq!(c.replacement("vAbc"), "$vAbc");
    }
}
