//! The token generator.
//!
//! [`TokenGenerator::generate`] derives a candidate, rejects it while it
//! leaks a three-character window of the original (up to
//! [`GeneratorOptions::max_attempts`] tries), then disambiguates it against
//! the original itself, reserved keywords and the caller's [`IssueContext`].

use crate::category::Category;
use crate::digest::KeyedDigest;
use crate::formats::{self, Seed};
use crate::issue::IssueContext;
use crate::keywords;

/// Default length of the derived core of `IDENT` and `WORD` tokens.
pub const DEFAULT_CORE_LEN: usize = 12;

/// Default bound on anti-leakage retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Re-derivations tried for fixed-format categories before falling back to
/// a numeric suffix.
const MAX_REGENERATIONS: u32 = 1000;

/// Minimum window length considered a leak.
const LEAK_WINDOW: usize = 3;

/// Tuning knobs for [`TokenGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Length of the derived core for identifiers and words.
    pub core_len: usize,
    /// Bound on anti-leakage retries.
    pub max_attempts: u32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            core_len: DEFAULT_CORE_LEN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GeneratorOptions {
    /// Set the core length.
    #[must_use]
    pub const fn core_len(mut self, len: usize) -> Self {
        self.core_len = len;
        self
    }

    /// Set the retry bound.
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

/// One value to be tokenised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRequest<'a> {
    /// The original value.
    pub original: &'a str,
    /// Its category.
    pub category: Category,
    /// The namespace scoping determinism.
    pub namespace: &'a str,
    /// Target language for identifiers (keyword avoidance, derivation input).
    pub language: Option<&'a str>,
}

impl<'a> TokenRequest<'a> {
    /// Create a request with no target language.
    #[must_use]
    pub const fn new(original: &'a str, category: Category, namespace: &'a str) -> Self {
        Self {
            original,
            category,
            namespace,
            language: None,
        }
    }

    /// Set the target language.
    #[must_use]
    pub const fn language(mut self, language: &'a str) -> Self {
        self.language = Some(language);
        self
    }
}

/// The outcome of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedToken {
    /// The issued token.
    pub value: String,
    /// Anti-leakage attempts used (at least 1).
    pub attempts: u32,
    /// `true` when every attempt leaked and the last candidate was kept.
    pub exhausted: bool,
}

/// Deterministic, keyed token factory.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    digest: KeyedDigest,
    options: GeneratorOptions,
}

impl TokenGenerator {
    /// Create a generator keyed with `secret` and default options.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self::with_options(secret, GeneratorOptions::default())
    }

    /// Create a generator with explicit options.
    #[must_use]
    pub fn with_options(secret: &[u8], options: GeneratorOptions) -> Self {
        Self {
            digest: KeyedDigest::new(secret),
            options,
        }
    }

    /// The options in effect.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate a token for `request` and record it in `issued`.
    ///
    /// Never fails. When every attempt leaks, the last candidate is returned
    /// with [`GeneratedToken::exhausted`] set.
    pub fn generate(&self, request: &TokenRequest<'_>, issued: &mut IssueContext) -> GeneratedToken {
        let max_attempts = self.options.max_attempts.max(1);
        let mut candidate = String::new();
        let mut salt = String::new();
        let mut attempts = 0;
        let mut clean = false;

        for attempt in 0..max_attempts {
            attempts = attempt + 1;
            salt = if attempt == 0 {
                String::new()
            } else {
                attempt.to_string()
            };
            candidate = self.derive(request, &salt);
            if !leaks(request.category, &candidate, request.original) {
                clean = true;
                break;
            }
        }

        if !clean {
            tracing::warn!(
                category = %request.category,
                attempts,
                "anti-leakage retries exhausted, keeping last candidate"
            );
        }

        let value = self.disambiguate(request, candidate, &salt, issued);
        issued.insert(value.clone());

        GeneratedToken {
            value,
            attempts,
            exhausted: !clean,
        }
    }

    fn derive(&self, request: &TokenRequest<'_>, salt: &str) -> String {
        let seed = Seed {
            digest: &self.digest,
            category: request.category,
            namespace: request.namespace,
            language: request.language.unwrap_or_default(),
            original: request.original,
            salt,
        };
        formats::render(&seed, self.options.core_len)
    }

    fn disambiguate(
        &self,
        request: &TokenRequest<'_>,
        candidate: String,
        salt: &str,
        issued: &IssueContext,
    ) -> String {
        let taken = |token: &str| {
            token == request.original
                || issued.contains(token)
                || (request.category == Category::Ident
                    && request
                        .language
                        .is_some_and(|lang| keywords::is_reserved(lang, token)))
        };

        if !taken(&candidate) {
            return candidate;
        }

        if request.category.is_fixed_format() {
            for round in 1..=MAX_REGENERATIONS {
                let alternative = self.derive(request, &format!("{salt}c{round}"));
                if !taken(&alternative) && !leaks(request.category, &alternative, request.original)
                {
                    return alternative;
                }
            }
        }

        let mut n = 2u64;
        loop {
            let alternative = formats::with_suffix(request.category, &candidate, n);
            if !taken(&alternative) {
                return alternative;
            }
            n += 1;
        }
    }
}

/// Whether `token` contains, case-insensitively, any window of at least
/// three characters of `original`.
///
/// Windows made only of punctuation or whitespace carry nothing of the
/// original and are ignored.
#[must_use]
pub fn contains_leak(token: &str, original: &str) -> bool {
    let haystack = token.to_lowercase();
    let chars: Vec<char> = original.to_lowercase().chars().collect();
    if chars.len() < LEAK_WINDOW {
        return false;
    }

    chars.windows(LEAK_WINDOW).any(|window| {
        window.iter().any(|c| c.is_alphanumeric())
            && haystack.contains(&window.iter().collect::<String>())
    })
}

fn leaks(category: Category, candidate: &str, original: &str) -> bool {
    contains_leak(formats::checked_region(category, candidate), original)
}
