//! Error types for veil.
//!
//! The taxonomy follows how each failure must be treated:
//!
//! - parse and unsupported-language/category errors abort the operation;
//! - store *read* failures never reach the caller (they degrade to an empty
//!   mapping and are logged), but store *write* failures do, because an
//!   unrecorded token breaks later unmasking;
//! - generation exhaustion is only an error when strict generation is on;
//! - a token that would be ambiguous in the output aborts the operation;
//! - invalid ranges are filtered, never raised.

use std::path::PathBuf;

use thiserror::Error;
use veil_token::{Category, TokenError};

/// The main error type for veil operations.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The external parser could not produce a syntax tree.
    #[error("failed to parse source: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// No language configuration exists for the requested language.
    #[error("language not supported: {name}")]
    UnsupportedLanguage {
        /// The requested language name.
        name: String,
    },

    /// The category is not supported.
    #[error("category not supported: {name}")]
    UnsupportedCategory {
        /// The requested category name.
        name: String,
    },

    /// Mapping store failure.
    #[error("mapping store error: {0}")]
    Store(#[from] StoreError),

    /// Secret retrieval or persistence failure.
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),

    /// Strict generation is on and a token could not be made leak-free.
    #[error("could not derive a leak-free {category} token within the retry bound")]
    GenerationExhausted {
        /// Category of the value being masked.
        category: Category,
    },

    /// A token this call would emit already stands in the input text, so the
    /// masked output could not be unmasked unambiguously.
    #[error("a {category} token already appears in the input; masked output would be ambiguous")]
    AmbiguousToken {
        /// Category of the value being masked.
        category: Category,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the encrypted mapping store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("{context} ({path}): {source}", path = path.display())]
    Io {
        /// What operation was being performed.
        context: String,
        /// The store file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Sealing the record set failed.
    #[error("encryption failed: {reason}")]
    Encrypt {
        /// Why encryption failed.
        reason: String,
    },

    /// Opening a payload failed (bad key, tampered data, wrong layout).
    #[error("decryption failed: {reason}")]
    Decrypt {
        /// Why decryption failed.
        reason: String,
    },

    /// The decrypted payload is not a valid record set.
    #[error("malformed store payload: {reason}")]
    Malformed {
        /// What was wrong with the payload.
        reason: String,
    },

    /// The store key could not be derived.
    #[error("key derivation failed: {reason}")]
    KeyDerivation {
        /// Why derivation failed.
        reason: String,
    },

    /// Serializing the record set failed.
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The blocking key-derivation task did not complete.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors raised while resolving the installation secret.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Reading, writing or removing a secret file failed.
    #[error("{context} ({path}): {source}", path = path.display())]
    Io {
        /// What operation was being performed.
        context: String,
        /// The secret file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Stored secret material is not a 32-byte hex string.
    #[error("malformed secret: {reason}")]
    Malformed {
        /// What was wrong with the material.
        reason: String,
    },

    /// A provider cannot be used on this system.
    #[error("secret provider '{provider}' is unavailable: {reason}")]
    Unavailable {
        /// The provider name.
        provider: String,
        /// Why it is unavailable.
        reason: String,
    },
}

/// The error an external parser reports through [`crate::extract::SyntaxParser`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Description of the failure.
    pub message: String,
}

impl ParseError {
    /// Create a parse error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for veil operations.
pub type Result<T> = std::result::Result<T, MaskError>;

impl MaskError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an unsupported-language error.
    pub fn unsupported_language(name: impl Into<String>) -> Self {
        Self::UnsupportedLanguage { name: name.into() }
    }

    /// Create an unsupported-category error.
    pub fn unsupported_category(name: impl Into<String>) -> Self {
        Self::UnsupportedCategory { name: name.into() }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Check if this is a parse error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this is a store error.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Check if this error rejects an unsupported language or category.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLanguage { .. } | Self::UnsupportedCategory { .. }
        )
    }
}

impl From<ParseError> for MaskError {
    fn from(err: ParseError) -> Self {
        Self::Parse {
            message: err.message,
        }
    }
}

impl From<TokenError> for MaskError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::UnsupportedCategory { name } => Self::UnsupportedCategory { name },
        }
    }
}

impl StoreError {
    /// Create an I/O error for the store file at `path`.
    pub fn io(context: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an encryption error.
    pub fn encrypt(reason: impl Into<String>) -> Self {
        Self::Encrypt {
            reason: reason.into(),
        }
    }

    /// Create a decryption error.
    pub fn decrypt(reason: impl Into<String>) -> Self {
        Self::Decrypt {
            reason: reason.into(),
        }
    }

    /// Create a malformed-payload error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Create a key-derivation error.
    pub fn key_derivation(reason: impl Into<String>) -> Self {
        Self::KeyDerivation {
            reason: reason.into(),
        }
    }
}

impl SecretError {
    /// Create an I/O error for the secret file at `path`.
    pub fn io(context: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a malformed-secret error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Create a provider-unavailable error.
    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MaskError::unsupported_language("cobol");
        assert_eq!(err.to_string(), "language not supported: cobol");
        assert!(err.is_unsupported());

        let err = MaskError::parse("grammar not loaded");
        assert!(err.is_parse());
        assert!(err.to_string().contains("grammar not loaded"));
    }

    #[test]
    fn token_error_converts() {
        let err: MaskError = TokenError::unsupported_category("SSN").into();
        assert!(matches!(err, MaskError::UnsupportedCategory { ref name } if name == "SSN"));
    }

    #[test]
    fn store_error_wraps() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MaskError = StoreError::io("writing mapping store", "/tmp/x.enc", io).into();
        assert!(err.is_store());
        assert!(err.to_string().contains("/tmp/x.enc"));
    }
}
