//! Owned syntax tree handed over by an external parser.

use crate::error::ParseError;

/// One node of a parsed syntax tree.
///
/// Spans are byte offsets into the parsed source. `field` is the name under
/// which the node hangs off its parent (`"name"`, `"attribute"`, ...) when
/// the grammar names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Grammar type tag (`identifier`, `function_definition`, ...).
    pub kind: String,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Source text covered by the node.
    pub text: String,
    /// Field name under the parent, if any.
    pub field: Option<String>,
    /// Child nodes in source order.
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a node with no field and no children.
    pub fn new(kind: impl Into<String>, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            start,
            end,
            text: text.into(),
            field: None,
            children: Vec::new(),
        }
    }

    /// Create a node whose text is sliced out of `source`.
    ///
    /// An out-of-range span yields empty text.
    pub fn spanning(kind: impl Into<String>, source: &str, start: usize, end: usize) -> Self {
        let text = source.get(start..end).unwrap_or_default();
        Self::new(kind, start, end, text)
    }

    /// Set the field name.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child in place.
    pub fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// First child attached under `field`.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&Self> {
        self.children
            .iter()
            .find(|c| c.field.as_deref() == Some(field))
    }

    /// Whether the node has the given kind.
    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Whether the node was attached under `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.field.as_deref() == Some(field)
    }

    /// Count of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// Produces a [`SyntaxNode`] tree from source text.
///
/// Grammar bindings live outside this crate; adapt them by implementing this
/// trait, or pass a closure.
pub trait SyntaxParser {
    /// Parse `code` into a tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar is unavailable or the code cannot be
    /// turned into a tree at all.
    fn parse(&self, code: &str) -> Result<SyntaxNode, ParseError>;
}

impl<F> SyntaxParser for F
where
    F: Fn(&str) -> Result<SyntaxNode, ParseError>,
{
    fn parse(&self, code: &str) -> Result<SyntaxNode, ParseError> {
        self(code)
    }
}
