//! Syntax-aware identifier extraction.
//!
//! The extractor consumes a tree produced by an external parser (see
//! [`SyntaxParser`]) and a [`LanguageConfig`], and reports every maskable
//! identifier grouped by name.
//!
//! # Example
//!
//! ```rust
//! use veil::extract::{IdentifierExtractor, LanguageConfig, SyntaxNode};
//!
//! let src = "total = price";
//! let root = SyntaxNode::spanning("module", src, 0, src.len())
//!     .with_child(SyntaxNode::spanning("identifier", src, 0, 5))
//!     .with_child(SyntaxNode::spanning("identifier", src, 8, 13));
//!
//! let python = LanguageConfig::python();
//! let found = IdentifierExtractor::new(&python).extract(&root, src);
//! assert_eq!(found.len(), 2);
//! ```

mod language;
mod tree;
mod walker;

pub use language::{LanguageConfig, LanguageConfigBuilder, NameExtractor, NodeContext, NodePredicate};
pub use tree::{SyntaxNode, SyntaxParser};
pub use walker::{Extraction, IdentifierExtractor, IdentifierGroup, Occurrence};
