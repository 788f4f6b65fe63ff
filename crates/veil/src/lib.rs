//! veil: Reversible, format-preserving masking
//!
//! Replaces identifiers in source code, and words, emails, URLs, UUIDs,
//! phone numbers and numbers in free text, with synthetic tokens that keep
//! the original's shape. The token for a value is stable per namespace and
//! is recorded in an encrypted local store, so masked text can be restored
//! later.
//!
//! # Features
//!
//! - **Syntax-aware extraction** over any parser that yields a
//!   [`SyntaxNode`] tree, configured per language by [`LanguageConfig`]
//! - **Pattern detection** for emails, URLs, UUIDs and phone numbers
//! - **Overlap-safe rewriting**: longest span wins, replacement right to left
//! - **Encrypted mapping store**: AES-256-GCM under an scrypt-derived key
//! - **Blocking facade** for synchronous callers ([`SyncMasker`])
//!
//! # Example
//!
//! ```rust,no_run
//! use veil::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> veil::Result<()> {
//!     let masker = Masker::builder()
//!         .config(MaskerConfig::default().with_default_paths()?)
//!         .build()
//!         .await?;
//!
//!     let text = "mail jane@example.com about ticket 42";
//!     let selected = vec!["jane@example.com".to_string(), "42".to_string()];
//!     let masked = masker.select_mask(text, &selected, "support", None).await?;
//!
//!     let restored = masker.unmask_namespace(&masked.text, "support").await;
//!     assert_eq!(restored, text);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod logging;
pub mod masker;
pub mod prelude;
pub mod ranges;
pub mod store;
pub mod sync;
pub mod unmask;

mod boundary;

pub use config::{
    GenerationConfig, KdfConfig, LogFormat, LoggingConfig, MaskerConfig, SecretConfig,
    StoreConfig,
};
pub use detect::{Detection, PatternDetector};
pub use error::{MaskError, ParseError, Result, SecretError, StoreError};
pub use extract::{
    Extraction, IdentifierExtractor, LanguageConfig, SyntaxNode, SyntaxParser,
};
pub use logging::init_logging;
pub use masker::{MaskOutcome, Masker, MaskerBuilder, SkippedSelection};
pub use ranges::Range;
pub use store::{
    FileSecretProvider, MappingEntry, MappingStore, MemorySecretProvider, Secret,
    SecretProvider, SecretResolver, SecretSource, StoreSession,
};
pub use sync::{SyncMasker, block_on};
pub use unmask::{unmask, unmask_with_ranges};
pub use veil_token::{Category, GeneratedToken, IssueContext, TokenGenerator, TokenRequest};

// Test utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
