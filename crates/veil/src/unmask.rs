//! Restoring originals from tokens.
//!
//! Unmasking is a pure substitution: every standalone occurrence of a known
//! token is replaced by its original. Longer tokens win over tokens they
//! contain, through the same overlap resolution masking uses.

use std::collections::HashMap;

use tracing::debug;

use crate::boundary::{Separation, find_standalone};
use crate::ranges::{self, Range};

/// Replace every standalone token in `text` with its original.
///
/// Tokens glued to a neighbouring word character are left alone, so a token
/// that happens to appear inside a longer word is not touched.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
///
/// let map = HashMap::from([("vQxTrm".to_string(), "total".to_string())]);
/// assert_eq!(veil::unmask("print(vQxTrm)", &map), "print(total)");
/// assert_eq!(veil::unmask("vQxTrmX", &map), "vQxTrmX");
/// ```
#[must_use]
pub fn unmask(text: &str, tokens: &HashMap<String, String>) -> String {
    unmask_with_ranges(text, tokens).0
}

/// Like [`unmask`], also returning the ranges that were applied.
#[must_use]
pub fn unmask_with_ranges(text: &str, tokens: &HashMap<String, String>) -> (String, Vec<Range>) {
    if text.is_empty() || tokens.is_empty() {
        return (text.to_string(), Vec::new());
    }

    let candidates: Vec<Range> = tokens
        .iter()
        .filter(|(token, _)| !token.is_empty() && text.contains(token.as_str()))
        .flat_map(|(token, original)| {
            find_standalone(text, token, true, Separation::Edges)
                .into_iter()
                .map(move |(start, end)| Range::new(start, end, original.clone()))
        })
        .collect();

    let found = candidates.len();
    let (restored, applied) = ranges::rewrite(text, candidates);
    debug!(found, applied = applied.len(), "unmasked text");
    (restored, applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(t, o)| ((*t).to_string(), (*o).to_string()))
            .collect()
    }

    #[test]
    fn longest_token_wins() {
        let tokens = map(&[("vAbc", "short"), ("vAbc_2", "longer")]);
        assert_eq!(unmask("vAbc_2 + vAbc", &tokens), "longer + short");
    }

    #[test]
    fn sigil_prefixed_tokens_restore() {
        let tokens = map(&[("vAbc", "total")]);
        assert_eq!(unmask("echo $vAbc;", &tokens), "echo $total;");
    }

    #[test]
    fn punctuation_edges_may_touch_words() {
        let tokens = map(&[("(555) 010-2345", "(212) 555-0100")]);
        assert_eq!(unmask("tel:(555) 010-2345.", &tokens), "tel:(212) 555-0100.");
    }

    #[test]
    fn numeric_token_inside_decimal_is_kept() {
        let tokens = map(&[("17", "42")]);
        assert_eq!(unmask("3.17 and 17", &tokens), "3.17 and 42");
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(unmask("", &map(&[("a", "b")])), "");
        assert_eq!(unmask("abc", &HashMap::new()), "abc");
    }
}
