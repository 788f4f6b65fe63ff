//! Test utilities for veil.
//!
//! A small Python parser that produces tree-sitter shaped trees, sample
//! sources, and configs cheap enough for unit tests.

pub mod fixtures;
mod toy_parser;

pub use toy_parser::ToyPythonParser;

use crate::config::{KdfConfig, MaskerConfig};
use crate::masker::{Masker, MaskerBuilder};
use crate::store::Secret;

/// In-memory store with scrypt parameters far below production strength.
#[must_use]
pub fn fast_config() -> MaskerConfig {
    let mut config = MaskerConfig::default();
    config.store.path = None;
    config.secret.file = None;
    config.store.kdf = KdfConfig {
        log_n: 4,
        r: 8,
        p: 1,
    };
    config
}

/// A fixed secret so token assertions are reproducible.
#[must_use]
pub fn test_secret() -> Secret {
    Secret::from_bytes([0x5a; 32])
}

/// Builder preloaded with [`fast_config`] and [`test_secret`].
#[must_use]
pub fn test_builder() -> MaskerBuilder {
    Masker::builder().config(fast_config()).secret(test_secret())
}
