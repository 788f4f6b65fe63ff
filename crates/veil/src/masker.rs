//! The masking engine.
//!
//! [`Masker`] ties the pieces together: candidates come from the identifier
//! extractor, the pattern detector or a caller selection; spans are resolved
//! first, then every surviving candidate is turned into a token through one
//! store session, and the text is rewritten right to left.
//!
//! A masking call either records every new token durably and returns the
//! masked text, or returns an error and no text at all. Fresh tokens never
//! equal a value already standing in the input, and a call that would emit a
//! token the input already contains fails with [`MaskError::AmbiguousToken`].

mod builder;
pub(crate) mod candidates;
mod outcome;

use tracing::{debug, info, warn};
use veil_token::{Category, IssueContext, TokenGenerator, TokenRequest};

pub use builder::MaskerBuilder;
pub use outcome::{MaskOutcome, SkippedSelection};

use crate::config::GenerationConfig;
use crate::detect::PatternDetector;
use crate::error::{MaskError, Result};
use crate::extract::{IdentifierExtractor, LanguageConfig, SyntaxParser};
use crate::ranges::{self, Range};
use crate::store::{MappingEntry, MappingStore, SecretResolver, SecretSource};
use candidates::Candidate;

/// Reversible masking over an encrypted mapping store.
///
/// Obtain one with [`Masker::builder`].
#[derive(Debug)]
pub struct Masker {
    store: MappingStore,
    generator: TokenGenerator,
    detector: PatternDetector,
    generation: GenerationConfig,
    resolver: SecretResolver,
    secret_source: SecretSource,
}

/// How candidate originals are keyed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keying {
    Exact,
    /// Reuse an entry whose original differs only in case.
    Folded,
}

impl Masker {
    /// Start configuring a masker.
    #[must_use]
    pub fn builder() -> MaskerBuilder {
        MaskerBuilder::new()
    }

    /// The underlying mapping store.
    #[must_use]
    pub const fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Where the installation secret came from.
    #[must_use]
    pub const fn secret_source(&self) -> &SecretSource {
        &self.secret_source
    }

    /// Mask every identifier in `code`.
    ///
    /// `parser` turns the code into a syntax tree; a parser failure aborts
    /// the call with [`MaskError::Parse`]. Identifiers are grouped
    /// case-insensitively and share one token per group, stored under the
    /// first-seen spelling. Member-access names are masked only when
    /// `include_properties` is set.
    ///
    /// # Errors
    ///
    /// Parse failures, store write failures, ambiguous tokens, and exhaustion
    /// in strict mode.
    pub async fn auto_mask<P>(
        &self,
        code: &str,
        parser: &P,
        language: &LanguageConfig,
        namespace: &str,
        include_properties: bool,
    ) -> Result<MaskOutcome>
    where
        P: SyntaxParser + ?Sized,
    {
        let root = parser.parse(code)?;
        let extraction = IdentifierExtractor::new(language)
            .include_properties(include_properties)
            .extract(&root, code);

        if extraction.is_empty() {
            debug!(namespace, language = language.name(), "no identifiers to mask");
            return Ok(MaskOutcome::unchanged(code, Vec::new()));
        }

        let found = candidates::from_extraction(&extraction, language);
        self.mint(code, found, namespace, Some(language.name()), Keying::Folded, Vec::new())
            .await
    }

    /// Mask a caller-chosen list of values.
    ///
    /// Each value is routed by its shape: numeric literals become `NUM`,
    /// quoted literals have their inner value masked (as email, URL, UUID,
    /// phone or `WORD`), bare identifiers become `IDENT` and match
    /// case-sensitively on whole-word boundaries. Values that cannot be
    /// masked are reported in [`MaskOutcome::skipped`] without aborting the
    /// rest. `language` steers keyword avoidance for identifier tokens.
    ///
    /// # Errors
    ///
    /// Unknown `language`, store write failures, ambiguous tokens, and
    /// exhaustion in strict mode.
    pub async fn select_mask(
        &self,
        text: &str,
        selected: &[String],
        namespace: &str,
        language: Option<&str>,
    ) -> Result<MaskOutcome> {
        let language = match language {
            Some(name) => Some(LanguageConfig::for_name(name)?),
            None => None,
        };

        let mut skipped = Vec::new();
        let found = candidates::from_selection(text, selected, &mut skipped);
        if !skipped.is_empty() {
            debug!(namespace, skipped = skipped.len(), "selection entries skipped");
        }
        self.mint(
            text,
            found,
            namespace,
            language.as_ref().map(LanguageConfig::name),
            Keying::Exact,
            skipped,
        )
        .await
    }

    /// Mask whole-word occurrences of `words` in free text as `WORD` tokens.
    ///
    /// A match must be bounded by a non-word character (anything outside
    /// `[A-Za-z0-9_]`) or the edge of the text. With `case_sensitive` off,
    /// every spelling found is masked and stored under its own spelling.
    ///
    /// # Errors
    ///
    /// Store write failures, ambiguous tokens, and exhaustion in strict mode.
    pub async fn mask_selected_words(
        &self,
        text: &str,
        words: &[String],
        namespace: &str,
        case_sensitive: bool,
    ) -> Result<MaskOutcome> {
        let mut skipped = Vec::new();
        let found = candidates::from_words(text, words, case_sensitive, &mut skipped);
        self.mint(text, found, namespace, None, Keying::Exact, skipped)
            .await
    }

    /// Mask every email, URL, UUID and phone number the detector finds.
    ///
    /// # Errors
    ///
    /// Store write failures, ambiguous tokens, and exhaustion in strict mode.
    pub async fn mask_detected(&self, text: &str, namespace: &str) -> Result<MaskOutcome> {
        let found = candidates::from_detections(self.detector.detect(text));
        self.mint(text, found, namespace, None, Keying::Exact, Vec::new())
            .await
    }

    /// Restore every token of `namespace` in `text`.
    pub async fn unmask_namespace(&self, text: &str, namespace: &str) -> String {
        let tokens = self.store.token_map(namespace).await;
        crate::unmask::unmask(text, &tokens)
    }

    /// Namespaces with stored mappings.
    pub async fn list_namespaces(&self) -> Vec<String> {
        self.store.list_namespaces().await
    }

    /// Find the entry for `token`, optionally within one namespace.
    pub async fn reverse_lookup(&self, token: &str, namespace: Option<&str>) -> Option<MappingEntry> {
        match namespace {
            Some(namespace) => self.store.reverse_lookup_in_namespace(token, namespace).await,
            None => self.store.reverse_lookup(token).await,
        }
    }

    /// Forget every mapping of `namespace`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Store write failures.
    pub async fn wipe_namespace(&self, namespace: &str) -> Result<usize> {
        Ok(self.store.wipe_namespace(namespace).await?)
    }

    /// Delete the mapping store and every persisted copy of the secret.
    ///
    /// Tokens issued so far can no longer be unmasked. The masker keeps its
    /// in-memory secret, so later calls behave like a fresh installation
    /// that happens to reuse it until the process ends.
    ///
    /// # Errors
    ///
    /// Store or secret deletion failures.
    pub async fn wipe_all(&self) -> Result<()> {
        self.store.wipe_all().await?;
        let removed = self.resolver.delete_all().await?;
        info!(secret_removed = removed, "wiped all masking state");
        Ok(())
    }

    /// Resolve spans, mint tokens in one store session, and rewrite.
    async fn mint(
        &self,
        text: &str,
        found: Vec<Candidate>,
        namespace: &str,
        language: Option<&str>,
        keying: Keying,
        skipped: Vec<SkippedSelection>,
    ) -> Result<MaskOutcome> {
        let total = found.len();
        let settled = candidates::settle(text, found);
        if settled.is_empty() {
            return Ok(MaskOutcome::unchanged(text, skipped));
        }

        let mut session = self.store.begin().await;
        let mut issued = IssueContext::seeded(session.tokens_in_namespace(namespace));
        for value in candidates::resident_values(text) {
            issued.insert(value);
        }
        let mut exhausted: Vec<Category> = Vec::new();
        let mut emitted: Vec<(Category, String)> = Vec::new();
        let mut applied = Vec::with_capacity(settled.len());

        for candidate in &settled {
            let kind = candidate.kind;
            let original = match keying {
                Keying::Folded => session
                    .lookup_folded(kind, namespace, &candidate.original)
                    .map_or_else(|| candidate.original.clone(), |(stored, _)| stored.to_string()),
                Keying::Exact => candidate.original.clone(),
            };

            let token = session.remember(kind, namespace, &original, || {
                let mut request = TokenRequest::new(&original, kind, namespace);
                if kind == Category::Ident
                    && let Some(language) = language
                {
                    request = request.language(language);
                }
                let generated = self.generator.generate(&request, &mut issued);
                if generated.exhausted {
                    exhausted.push(kind);
                }
                generated.value
            });

            applied.push(Range::new(
                candidate.start,
                candidate.end,
                candidate.replacement(&token),
            ));
            if !emitted.iter().any(|(_, t)| *t == token) {
                emitted.push((kind, token));
            }
        }

        // A stored token reused here may already stand in the text.
        if let Some((category, _)) = emitted
            .iter()
            .find(|(_, token)| candidates::stands_outside(text, token, &applied))
        {
            warn!(namespace, category = %category, "token already present in the input, failing closed");
            return Err(MaskError::AmbiguousToken {
                category: *category,
            });
        }

        if let Some(&category) = exhausted.first() {
            if self.generation.strict {
                // Dropping the session discards everything minted here.
                warn!(namespace, exhausted = exhausted.len(), "generation exhausted, failing closed");
                return Err(MaskError::GenerationExhausted { category });
            }
            warn!(
                namespace,
                exhausted = exhausted.len(),
                "tokens kept after exhausted anti-leakage retries"
            );
        }

        let minted = session.commit().await?;
        applied.sort_by_key(|r| r.start);
        let rendered = ranges::apply(text, &applied);
        debug!(
            namespace,
            candidates = total,
            applied = applied.len(),
            minted,
            "masked text"
        );

        Ok(MaskOutcome {
            text: rendered,
            applied,
            minted,
            exhausted: exhausted.len(),
            skipped,
        })
    }
}
