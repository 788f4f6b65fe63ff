//! Pattern detection for structured values in free text.
//!
//! Recognizes emails, URLs, UUIDs and phone numbers. Matches are reported
//! in source order and may overlap (a UUID inside a URL path, for example);
//! overlap is settled later by [`crate::ranges::resolve`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use veil_token::Category;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("Email pattern is a valid regex")
});

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:https?|ftp)://[^\s<>"'`]*[^\s<>"'`.,;:!?)\]}]"#)
        .expect("URL pattern is a valid regex")
});

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\b")
        .expect("UUID pattern is a valid regex")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-. ]?)?(?:\(\d{3}\)|\b\d{3})[-. ]?\d{3}[-. ]?\d{4}\b")
        .expect("Phone pattern is a valid regex")
});

static BARE_UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{32}$").expect("Bare UUID pattern is a valid regex")
});

static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)$").expect("Number pattern is a valid regex")
});

/// A structured value found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// The matched text.
    pub text: String,
    /// What kind of value it is.
    pub category: Category,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Detection {
    /// Length of the match in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the match is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Regex-based detector for emails, URLs, UUIDs and phone numbers.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    enabled: Vec<Category>,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector {
    /// Categories the detector knows how to find.
    pub const DETECTABLE: [Category; 4] =
        [Category::Email, Category::Url, Category::Uuid, Category::Phone];

    /// Create a detector with every detectable category enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: Self::DETECTABLE.to_vec(),
        }
    }

    /// Enable a category. Categories without a pattern are ignored.
    #[must_use]
    pub fn enable(mut self, category: Category) -> Self {
        if Self::DETECTABLE.contains(&category) && !self.enabled.contains(&category) {
            self.enabled.push(category);
        }
        self
    }

    /// Disable a category.
    #[must_use]
    pub fn disable(mut self, category: Category) -> Self {
        self.enabled.retain(|c| c != &category);
        self
    }

    /// Categories currently enabled.
    #[must_use]
    pub fn enabled(&self) -> &[Category] {
        &self.enabled
    }

    /// Find every structured value in `text`, ordered by start offset.
    #[must_use]
    pub fn detect(&self, text: &str) -> Vec<Detection> {
        let mut found = Vec::new();
        for category in &self.enabled {
            let Some(pattern) = pattern_for(*category) else {
                continue;
            };
            found.extend(pattern.find_iter(text).map(|m| Detection {
                text: m.as_str().to_string(),
                category: *category,
                start: m.start(),
                end: m.end(),
            }));
        }

        found.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));
        found
    }

    /// Check if any enabled category matches.
    #[must_use]
    pub fn contains_any(&self, text: &str) -> bool {
        self.enabled
            .iter()
            .filter_map(|c| pattern_for(*c))
            .any(|p| p.is_match(text))
    }
}

fn pattern_for(category: Category) -> Option<&'static Regex> {
    match category {
        Category::Email => Some(&EMAIL_PATTERN),
        Category::Url => Some(&URL_PATTERN),
        Category::Uuid => Some(&UUID_PATTERN),
        Category::Phone => Some(&PHONE_PATTERN),
        Category::Ident | Category::Word | Category::Num => None,
    }
}

/// Classify a whole value (not a search within text).
///
/// Returns the structured category the entire value matches, checking URL
/// before email so `https://user@host.com` is a URL. Bare 32-digit hex
/// strings count as UUIDs. Returns `None` for anything unstructured.
#[must_use]
pub fn classify(value: &str) -> Option<Category> {
    let whole = |re: &Regex| re.find(value).is_some_and(|m| m.start() == 0 && m.end() == value.len());

    if whole(&URL_PATTERN) {
        Some(Category::Url)
    } else if whole(&EMAIL_PATTERN) {
        Some(Category::Email)
    } else if whole(&UUID_PATTERN) || BARE_UUID_PATTERN.is_match(value) {
        Some(Category::Uuid)
    } else if whole(&PHONE_PATTERN) {
        Some(Category::Phone)
    } else {
        None
    }
}

/// Whether `value` is a numeric literal (optional sign, optional fraction).
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    NUMBER_PATTERN.is_match(value) && value.chars().any(|c| c.is_ascii_digit())
}
