//! veil-token: Deterministic, shape-preserving opaque tokens
//!
//! This crate derives the synthetic replacement values used by the `veil`
//! masking engine. A token is a pure function of
//! `(secret, namespace, category, original)` plus a bounded retry counter,
//! and is rendered so that it still *looks like* the value it replaces.
//!
//! # Quick Start
//!
//! ```
//! use veil_token::{Category, IssueContext, TokenGenerator, TokenRequest};
//!
//! let generator = TokenGenerator::new(b"an installation secret of 32 byte");
//! let mut issued = IssueContext::new();
//!
//! let ident = generator.generate(
//!     &TokenRequest::new("MyClassName", Category::Ident, "repo-1"),
//!     &mut issued,
//! );
//! assert!(ident.value.starts_with('V'));
//!
//! let uuid = generator.generate(
//!     &TokenRequest::new("123e4567-e89b-12d3-a456-426614174000", Category::Uuid, "repo-1"),
//!     &mut issued,
//! );
//! assert_eq!(uuid.value.len(), 36);
//! ```
//!
//! # Guarantees
//!
//! - **Shape**: naming style for identifiers, punctuation skeleton for phone
//!   numbers, hyphenation for UUIDs, sign/decimal/width for numbers.
//! - **No leakage**: a candidate containing any three-character window of the
//!   original (case-insensitive) is rejected and re-derived, up to a bounded
//!   number of attempts.
//! - **Collision freedom**: tokens already present in the caller's
//!   [`IssueContext`] are never handed out twice.

pub mod category;
pub mod digest;
pub mod error;
pub mod generator;
pub mod issue;
pub mod keywords;
pub mod style;

mod formats;

// Re-export primary types
pub use category::Category;
pub use digest::KeyedDigest;
pub use error::{Result, TokenError};
pub use generator::{
    DEFAULT_CORE_LEN, DEFAULT_MAX_ATTEMPTS, GeneratedToken, GeneratorOptions, TokenGenerator,
    TokenRequest, contains_leak,
};
pub use issue::IssueContext;
pub use style::{Composition, NamingStyle};
