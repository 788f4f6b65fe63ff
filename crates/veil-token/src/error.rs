//! Error types for the veil-token crate.
//!
//! Token generation itself never fails; the only fallible surface is parsing
//! category names that arrive from callers or from persisted records.

/// The error type for token operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The category name is not one of the supported categories.
    #[error("category not supported: {name}")]
    UnsupportedCategory {
        /// The rejected category name.
        name: String,
    },
}

impl TokenError {
    /// Create an unsupported-category error.
    pub fn unsupported_category(name: impl Into<String>) -> Self {
        Self::UnsupportedCategory { name: name.into() }
    }
}

/// A specialized Result type for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
