//! Convenient re-exports for common veil usage.
//!
//! ```ignore
//! use veil::prelude::*;
//! ```

// Engine
pub use crate::masker::{MaskOutcome, Masker, MaskerBuilder, SkippedSelection};
pub use crate::sync::SyncMasker;
pub use crate::unmask::unmask;

// Configuration and errors
pub use crate::config::{LogFormat, LoggingConfig, MaskerConfig};
pub use crate::error::{MaskError, Result};

// Extraction
pub use crate::extract::{LanguageConfig, SyntaxNode, SyntaxParser};

// Detection and tokens
pub use crate::detect::PatternDetector;
pub use veil_token::Category;
