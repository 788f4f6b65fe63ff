//! Whole-token boundary checks shared by masking and unmasking.

/// Word characters for boundary purposes: `[A-Za-z0-9_]`.
#[must_use]
pub(crate) const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// How strictly a span must be separated from its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separation {
    /// Neighbours must not be word characters. Nothing else counts.
    Word,
    /// As [`Separation::Word`], and a number inside a decimal is glued.
    Strict,
    /// Only edges that are word characters need a non-word neighbour. A
    /// number inside a decimal is glued.
    Edges,
}

/// Whether `text[start..end]` is not glued to surrounding word characters.
///
/// Except under [`Separation::Word`], a digit edge followed by `.` and
/// another digit also counts as glued, so `17` in `3.17` does not stand alone.
#[must_use]
pub(crate) fn stands_alone(text: &str, start: usize, end: usize, separation: Separation) -> bool {
    let span = &text[start..end];
    let (Some(first), Some(last)) = (span.chars().next(), span.chars().next_back()) else {
        return false;
    };

    !glued(first, text[..start].chars().rev(), separation)
        && !glued(last, text[end..].chars(), separation)
}

fn glued(edge: char, mut outward: impl Iterator<Item = char>, separation: Separation) -> bool {
    match outward.next() {
        None => false,
        Some(n) if is_word_char(n) => separation != Separation::Edges || is_word_char(edge),
        Some('.') if edge.is_ascii_digit() && separation != Separation::Word => {
            outward.next().is_some_and(|c| c.is_ascii_digit())
        }
        Some(_) => false,
    }
}

/// Spans of every standalone occurrence of `needle` in `text`.
///
/// Matching is literal; `case_sensitive = false` folds case.
#[must_use]
pub(crate) fn find_standalone(
    text: &str,
    needle: &str,
    case_sensitive: bool,
    separation: Separation,
) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    let pattern = if case_sensitive {
        regex::escape(needle)
    } else {
        format!("(?i){}", regex::escape(needle))
    };
    let Ok(re) = regex::Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    let mut pos = 0;
    while pos <= text.len() {
        let Some(m) = re.find_at(text, pos) else {
            break;
        };
        if stands_alone(text, m.start(), m.end(), separation) {
            found.push((m.start(), m.end()));
            pos = m.end();
        } else {
            // Retry from the next character; a rejected match may hide an
            // overlapping standalone one.
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_words_only() {
        let text = "concatenate cat scatter";
        let hits = find_standalone(text, "cat", true, Separation::Strict);
        assert_eq!(hits, vec![(12, 15)]);
    }

    #[test]
    fn case_folding() {
        let text = "Cat cat CAT";
        assert_eq!(find_standalone(text, "cat", true, Separation::Strict).len(), 1);
        assert_eq!(find_standalone(text, "cat", false, Separation::Strict).len(), 3);
    }

    #[test]
    fn overlapping_retry() {
        // "aa" at 0 is glued to the third 'a'; the standalone one follows.
        let text = "aaa aa";
        assert_eq!(find_standalone(text, "aa", true, Separation::Strict), vec![(4, 6)]);
    }

    #[test]
    fn decimals_are_glued() {
        assert!(!stands_alone("3.17", 2, 4, Separation::Strict));
        assert!(!stands_alone("3.17", 2, 4, Separation::Edges));
        assert!(stands_alone("Version 10.", 8, 10, Separation::Strict));
    }

    #[test]
    fn word_separation_treats_every_dot_as_a_boundary() {
        assert!(stands_alone("pi is 3.17", 8, 10, Separation::Word));
        assert!(stands_alone("pi is 3.17", 6, 7, Separation::Word));
        assert!(!stands_alone("pi is 3.17x", 8, 10, Separation::Word));
        assert_eq!(find_standalone("pi is 3.17", "17", true, Separation::Word), vec![(8, 10)]);
        assert!(find_standalone("pi is 3.17", "17", true, Separation::Strict).is_empty());
    }

    #[test]
    fn edge_separation_ignores_punctuation_edges() {
        // '+' edge may touch a word character under edge rules.
        assert!(stands_alone("x+1 555", 1, 7, Separation::Edges));
        assert!(!stands_alone("x+1 555", 1, 7, Separation::Strict));
    }
}
