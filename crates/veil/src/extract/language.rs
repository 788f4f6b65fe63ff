//! Per-language extraction rules.
//!
//! A [`LanguageConfig`] describes how to read one grammar's trees: which node
//! kinds can name something, how to reach the name inside wrapper nodes, which
//! names are built in, and which nodes are member accesses. Adding a language
//! means building a new config value; the walker never branches on language.

use std::collections::HashSet;
use std::fmt;

use super::tree::SyntaxNode;
use crate::error::{MaskError, Result};

/// A node under inspection together with its parent.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    /// The node being inspected.
    pub node: &'a SyntaxNode,
    /// Its parent, `None` at the root.
    pub parent: Option<&'a SyntaxNode>,
}

impl<'a> NodeContext<'a> {
    /// Create a context.
    #[must_use]
    pub const fn new(node: &'a SyntaxNode, parent: Option<&'a SyntaxNode>) -> Self {
        Self { node, parent }
    }

    /// Kind of the parent node, if any.
    #[must_use]
    pub fn parent_kind(&self) -> Option<&'a str> {
        self.parent.map(|p| p.kind.as_str())
    }
}

/// Decides something about a node.
pub type NodePredicate = fn(&NodeContext<'_>) -> bool;

/// Finds the node holding the maskable name of a matched node.
pub type NameExtractor = for<'a> fn(&NodeContext<'a>) -> Option<&'a SyntaxNode>;

/// Capability descriptor for one language.
#[derive(Clone)]
pub struct LanguageConfig {
    name: String,
    identifier_kinds: HashSet<String>,
    is_identifier: NodePredicate,
    extract_name: NameExtractor,
    builtins: HashSet<String>,
    is_property: Option<NodePredicate>,
    variable_prefix: Option<char>,
}

impl fmt::Debug for LanguageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageConfig")
            .field("name", &self.name)
            .field("identifier_kinds", &self.identifier_kinds)
            .field("builtins", &self.builtins.len())
            .field("has_property_predicate", &self.is_property.is_some())
            .field("variable_prefix", &self.variable_prefix)
            .finish_non_exhaustive()
    }
}

impl LanguageConfig {
    /// Start building a config for a caller-supplied language.
    pub fn builder(name: impl Into<String>) -> LanguageConfigBuilder {
        LanguageConfigBuilder::new(name)
    }

    /// Look up a bundled config by name.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::UnsupportedLanguage`] for languages without a
    /// bundled config.
    pub fn for_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Self::python()),
            "javascript" | "js" | "typescript" | "ts" | "jsx" | "tsx" => Ok(Self::javascript()),
            "php" => Ok(Self::php()),
            _ => Err(MaskError::unsupported_language(name)),
        }
    }

    /// Config for tree-sitter style Python trees.
    #[must_use]
    pub fn python() -> Self {
        Self::builder("python")
            .identifier_kinds([
                "identifier",
                "function_definition",
                "class_definition",
                "attribute",
            ])
            .is_identifier(|ctx| !python_name(ctx).is_some_and(is_dunder))
            .extract_name(python_name)
            .builtins(PYTHON_BUILTINS.iter().copied())
            .is_property(|ctx| {
                ctx.node.is("attribute")
                    || (ctx.parent_kind() == Some("attribute") && ctx.node.has_field("attribute"))
            })
            .build()
    }

    /// Config for tree-sitter style JavaScript and TypeScript trees.
    #[must_use]
    pub fn javascript() -> Self {
        Self::builder("javascript")
            .identifier_kinds([
                "identifier",
                "property_identifier",
                "shorthand_property_identifier",
                "type_identifier",
            ])
            .builtins(JAVASCRIPT_BUILTINS.iter().copied())
            .is_property(|ctx| {
                matches!(
                    ctx.node.kind.as_str(),
                    "property_identifier" | "shorthand_property_identifier"
                )
            })
            .build()
    }

    /// Config for tree-sitter style PHP trees.
    ///
    /// Variables are `variable_name` nodes whose text carries the `$` sigil;
    /// the inner `name` child is skipped so each variable is recorded once.
    #[must_use]
    pub fn php() -> Self {
        Self::builder("php")
            .identifier_kinds(["variable_name", "name"])
            .is_identifier(|ctx| !(ctx.node.is("name") && ctx.parent_kind() == Some("variable_name")))
            .builtins(PHP_BUILTINS.iter().copied())
            .is_property(|ctx| {
                ctx.node.is("name")
                    && matches!(
                        ctx.parent_kind(),
                        Some("member_access_expression" | "member_call_expression")
                    )
                    && ctx.node.has_field("name")
            })
            .variable_prefix('$')
            .build()
    }

    /// Language name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sigil some grammars keep in front of variable names.
    #[must_use]
    pub const fn variable_prefix(&self) -> Option<char> {
        self.variable_prefix
    }

    /// Whether the node kind can name something in this language.
    #[must_use]
    pub fn is_identifier_kind(&self, kind: &str) -> bool {
        self.identifier_kinds.contains(kind)
    }

    /// Whether `ctx.node` is an identifier to consider.
    #[must_use]
    pub fn is_identifier(&self, ctx: &NodeContext<'_>) -> bool {
        self.is_identifier_kind(&ctx.node.kind) && (self.is_identifier)(ctx)
    }

    /// The node carrying the maskable name for a matched node.
    #[must_use]
    pub fn extract_name<'a>(&self, ctx: &NodeContext<'a>) -> Option<&'a SyntaxNode> {
        (self.extract_name)(ctx)
    }

    /// Whether `name` is a built-in, compared case-insensitively.
    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(&name.to_lowercase())
    }

    /// Whether the node is a member access. Languages without a property
    /// predicate report `false`.
    #[must_use]
    pub fn is_property(&self, ctx: &NodeContext<'_>) -> bool {
        self.is_property.is_some_and(|f| f(ctx))
    }
}

/// Builder for [`LanguageConfig`].
#[derive(Clone)]
pub struct LanguageConfigBuilder {
    config: LanguageConfig,
}

impl fmt::Debug for LanguageConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LanguageConfigBuilder").field(&self.config).finish()
    }
}

impl LanguageConfigBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            config: LanguageConfig {
                name: name.into(),
                identifier_kinds: HashSet::from(["identifier".to_string()]),
                is_identifier: |_| true,
                extract_name: |ctx| Some(ctx.node),
                builtins: HashSet::new(),
                is_property: None,
                variable_prefix: None,
            },
        }
    }

    /// Replace the set of node kinds that can name something.
    #[must_use]
    pub fn identifier_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.identifier_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Set the identifier predicate, applied after the kind check.
    #[must_use]
    pub fn is_identifier(mut self, predicate: NodePredicate) -> Self {
        self.config.is_identifier = predicate;
        self
    }

    /// Set the name extractor.
    #[must_use]
    pub fn extract_name(mut self, extractor: NameExtractor) -> Self {
        self.config.extract_name = extractor;
        self
    }

    /// Add built-in names that are never masked.
    #[must_use]
    pub fn builtins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config
            .builtins
            .extend(names.into_iter().map(|n| n.as_ref().to_lowercase()));
        self
    }

    /// Set the member-access predicate.
    #[must_use]
    pub fn is_property(mut self, predicate: NodePredicate) -> Self {
        self.config.is_property = Some(predicate);
        self
    }

    /// Set the variable sigil.
    #[must_use]
    pub const fn variable_prefix(mut self, prefix: char) -> Self {
        self.config.variable_prefix = Some(prefix);
        self
    }

    /// Finish the config.
    #[must_use]
    pub fn build(self) -> LanguageConfig {
        self.config
    }
}

fn python_name<'a>(ctx: &NodeContext<'a>) -> Option<&'a SyntaxNode> {
    match ctx.node.kind.as_str() {
        "function_definition" | "class_definition" => ctx.node.child_by_field("name"),
        "attribute" => ctx.node.child_by_field("attribute"),
        _ => Some(ctx.node),
    }
}

fn is_dunder(node: &SyntaxNode) -> bool {
    let text = node.text.as_str();
    text.len() > 4 && text.starts_with("__") && text.ends_with("__")
}

const PYTHON_BUILTINS: &[&str] = &[
    "self", "cls", "print", "len", "range", "str", "int", "float", "bool", "list", "dict",
    "set", "tuple", "object", "type", "super", "isinstance", "issubclass", "open", "input",
    "enumerate", "zip", "map", "filter", "sorted", "reversed", "sum", "min", "max", "abs",
    "round", "any", "all", "iter", "next", "repr", "hash", "id", "format", "getattr", "setattr",
    "hasattr", "delattr", "property", "staticmethod", "classmethod", "exception", "valueerror",
    "typeerror", "keyerror", "indexerror", "runtimeerror", "none", "true", "false",
];

const JAVASCRIPT_BUILTINS: &[&str] = &[
    "console", "window", "document", "this", "undefined", "null", "nan", "infinity", "object",
    "array", "string", "number", "boolean", "symbol", "promise", "json", "math", "date", "error",
    "map", "set", "require", "module", "exports", "process", "globalthis", "settimeout",
    "setinterval", "cleartimeout", "clearinterval", "parseint", "parsefloat", "fetch",
];

const PHP_BUILTINS: &[&str] = &[
    "this", "_get", "_post", "_server", "_session", "_cookie", "_files", "_env", "_request",
    "globals", "echo", "print", "isset", "unset", "empty", "count", "strlen", "array",
    "array_map", "array_filter", "explode", "implode", "json_encode", "json_decode", "sprintf",
    "true", "false", "null",
];
