//! Call-scoped issuance tracking.

use std::collections::HashSet;

/// The set of tokens already handed out during one masking operation.
///
/// One context is created per call and passed by `&mut` into every
/// generation performed by that call, so two fresh values masked together
/// can never receive the same token. Seed it with the tokens already
/// persisted for the namespace to keep new tokens distinct from old ones.
#[derive(Debug, Clone, Default)]
pub struct IssueContext {
    issued: HashSet<String>,
}

impl IssueContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context pre-populated with existing tokens.
    #[must_use]
    pub fn seeded<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            issued: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `token` has already been issued.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.issued.contains(token)
    }

    /// Record `token` as issued. Returns `false` if it already was.
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.issued.insert(token.into())
    }

    /// Number of issued tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Whether nothing has been issued yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
