//! Tree walk that collects maskable identifier occurrences.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::language::{LanguageConfig, NodeContext};
use super::tree::SyntaxNode;

/// Names longer than this indicate a parser/config mismatch.
const MAX_IDENTIFIER_LEN: usize = 100;

/// Characters that never appear inside a real identifier.
const STRUCTURAL_CHARS: &[char] = &['{', '}', '(', ')', '\n', '\r'];

/// One place an identifier appears in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Source text at the span, including any variable sigil.
    pub text: String,
    /// Whether the source at this span carries the language's variable sigil.
    pub prefixed: bool,
}

/// All occurrences of one identifier.
///
/// Identifiers are grouped case-insensitively: `Foo` and `foo` share a group
/// and therefore a token. `name` keeps the first-seen casing without sigil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierGroup {
    /// Lower-cased grouping key.
    pub key: String,
    /// First-seen bare name.
    pub name: String,
    /// Occurrences in source order.
    pub occurrences: Vec<Occurrence>,
}

/// Output of an extraction, groups in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Identifier groups.
    pub groups: Vec<IdentifierGroup>,
}

impl Extraction {
    /// Number of distinct identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up a group by name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IdentifierGroup> {
        let key = name.to_lowercase();
        self.groups.iter().find(|g| g.key == key)
    }

    /// Total number of occurrences across groups.
    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        self.groups.iter().map(|g| g.occurrences.len()).sum()
    }
}

/// Walks syntax trees according to a [`LanguageConfig`].
#[derive(Debug, Clone)]
pub struct IdentifierExtractor<'c> {
    language: &'c LanguageConfig,
    include_properties: bool,
}

impl<'c> IdentifierExtractor<'c> {
    /// Create an extractor. Properties are excluded by default.
    #[must_use]
    pub const fn new(language: &'c LanguageConfig) -> Self {
        Self {
            language,
            include_properties: false,
        }
    }

    /// Whether member-access names are collected too.
    #[must_use]
    pub const fn include_properties(mut self, include: bool) -> Self {
        self.include_properties = include;
        self
    }

    /// Collect identifiers from `root`, a tree parsed from `source`.
    #[must_use]
    pub fn extract(&self, root: &SyntaxNode, source: &str) -> Extraction {
        let mut walk = Walk {
            extractor: self,
            source,
            seen: HashSet::new(),
            index: HashMap::new(),
            out: Extraction::default(),
        };
        walk.visit(root, None);

        for group in &mut walk.out.groups {
            group.occurrences.sort_by_key(|o| o.start);
        }
        debug!(
            language = self.language.name(),
            identifiers = walk.out.len(),
            occurrences = walk.out.occurrence_count(),
            "extracted identifiers"
        );
        walk.out
    }
}

struct Walk<'e, 'c, 's> {
    extractor: &'e IdentifierExtractor<'c>,
    source: &'s str,
    seen: HashSet<(usize, usize)>,
    index: HashMap<String, usize>,
    out: Extraction,
}

impl Walk<'_, '_, '_> {
    fn visit(&mut self, node: &SyntaxNode, parent: Option<&SyntaxNode>) {
        let ctx = NodeContext::new(node, parent);
        let language = self.extractor.language;

        if language.is_identifier(&ctx) {
            self.consider(&ctx);
        }

        for child in &node.children {
            self.visit(child, Some(node));
        }
    }

    fn consider(&mut self, ctx: &NodeContext<'_>) {
        let language = self.extractor.language;

        if !self.extractor.include_properties && language.is_property(ctx) {
            return;
        }

        let Some(target) = language.extract_name(ctx) else {
            return;
        };
        // The name node of a wrapper is visited again on the way down.
        let target_ctx = if std::ptr::eq(target, ctx.node) {
            *ctx
        } else {
            NodeContext::new(target, Some(ctx.node))
        };
        if !self.extractor.include_properties && language.is_property(&target_ctx) {
            return;
        }

        let text = target.text.as_str();
        if text.is_empty() || text.len() > MAX_IDENTIFIER_LEN || text.contains(STRUCTURAL_CHARS) {
            trace!(kind = %target.kind, len = text.len(), "rejected implausible identifier");
            return;
        }
        if self.source.get(target.start..target.end) != Some(text) {
            debug!(kind = %target.kind, start = target.start, "node text does not match source span");
            return;
        }

        let (bare, prefixed) = match language.variable_prefix() {
            Some(sigil) => match text.strip_prefix(sigil) {
                Some(rest) => (rest, true),
                None => (text, false),
            },
            None => (text, false),
        };
        if bare.is_empty() || language.is_builtin(bare) {
            return;
        }

        if !self.seen.insert((target.start, target.end)) {
            return;
        }

        let occurrence = Occurrence {
            start: target.start,
            end: target.end,
            text: text.to_string(),
            prefixed,
        };
        let key = bare.to_lowercase();
        if let Some(&slot) = self.index.get(&key) {
            self.out.groups[slot].occurrences.push(occurrence);
        } else {
            self.index.insert(key.clone(), self.out.groups.len());
            self.out.groups.push(IdentifierGroup {
                key,
                name: bare.to_string(),
                occurrences: vec![occurrence],
            });
        }
    }
}
