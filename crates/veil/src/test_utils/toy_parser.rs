//! A lexical stand-in for a real Python grammar.
//!
//! It recognises just enough structure to exercise the extractor: names,
//! `def`/`class` headers, dotted attribute chains, strings with f-string
//! interpolations, comments, numbers and keywords. Node kinds and field names
//! follow tree-sitter-python.

use crate::error::ParseError;
use crate::extract::{SyntaxNode, SyntaxParser};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Parses Python source into tree-sitter shaped [`SyntaxNode`]s.
///
/// Fails only on unterminated string literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToyPythonParser;

impl SyntaxParser for ToyPythonParser {
    fn parse(&self, code: &str) -> Result<SyntaxNode, ParseError> {
        let tokens = lex(code, 0, code.len())?;
        let mut root = SyntaxNode::spanning("module", code, 0, code.len());
        root.children = build(code, &tokens)?;
        Ok(root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Name,
    Keyword,
    Number,
    Str { interpolations: Vec<(usize, usize)> },
    Comment,
    Punct(u8),
}

#[derive(Debug, Clone)]
struct Token {
    kind: Kind,
    start: usize,
    end: usize,
}

fn lex(code: &str, from: usize, to: usize) -> Result<Vec<Token>, ParseError> {
    let bytes = code.as_bytes();
    let mut out = Vec::new();
    let mut i = from;

    while i < to {
        let c = bytes[i];
        if c.is_ascii_whitespace() || c == b'\\' {
            i += 1;
        } else if c == b'#' {
            let end = code[i..to].find('\n').map_or(to, |n| i + n);
            out.push(Token { kind: Kind::Comment, start: i, end });
            i = end;
        } else if c == b'"' || c == b'\'' {
            let token = string(code, i, i, to)?;
            i = token.end;
            out.push(token);
        } else if c.is_ascii_digit() {
            let end = scan(bytes, i, to, |b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_');
            out.push(Token { kind: Kind::Number, start: i, end });
            i = end;
        } else if c == b'_' || c.is_ascii_alphabetic() {
            let end = scan(bytes, i, to, |b| b == b'_' || b.is_ascii_alphanumeric());
            let word = &code[i..end];
            if end < to && matches!(bytes[end], b'"' | b'\'') && is_string_prefix(word) {
                let token = string(code, i, end, to)?;
                i = token.end;
                out.push(token);
                continue;
            }
            let kind = if KEYWORDS.contains(&word) {
                Kind::Keyword
            } else {
                Kind::Name
            };
            out.push(Token { kind, start: i, end });
            i = end;
        } else if c >= 0x80 {
            i += code[i..].chars().next().map_or(1, char::len_utf8);
        } else {
            out.push(Token { kind: Kind::Punct(c), start: i, end: i + 1 });
            i += 1;
        }
    }
    Ok(out)
}

fn scan(bytes: &[u8], from: usize, to: usize, keep: impl Fn(u8) -> bool) -> usize {
    (from..to).find(|&j| !keep(bytes[j])).unwrap_or(to)
}

fn is_string_prefix(word: &str) -> bool {
    word.len() <= 2
        && word
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'b' | 'f' | 'u'))
}

/// Lex a string literal whose prefix starts at `start` and quote at `quote`.
fn string(code: &str, start: usize, quote: usize, to: usize) -> Result<Token, ParseError> {
    let bytes = code.as_bytes();
    let q = bytes[quote];
    let triple = code[quote..to].as_bytes().starts_with(&[q, q, q]);
    let delim = if triple { 3 } else { 1 };
    let body = quote + delim;
    let formatted = code[start..quote].contains(['f', 'F']);

    let mut j = body;
    let close = loop {
        if j >= to || (!triple && bytes[j] == b'\n') {
            return Err(ParseError::new(format!(
                "unterminated string literal at byte {start}"
            )));
        }
        match bytes[j] {
            b'\\' => j += 2,
            b if b == q && (!triple || code[j..to].as_bytes().starts_with(&[q, q, q])) => break j,
            _ => j += 1,
        }
    };

    let interpolations = if formatted {
        interpolations(bytes, body, close)
    } else {
        Vec::new()
    };
    Ok(Token {
        kind: Kind::Str { interpolations },
        start,
        end: close + delim,
    })
}

/// Spans of `{...}` fields inside an f-string body, braces included.
fn interpolations(bytes: &[u8], from: usize, to: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut j = from;
    while j < to {
        if bytes[j] == b'{' {
            if j + 1 < to && bytes[j + 1] == b'{' {
                j += 2;
                continue;
            }
            let mut depth = 0usize;
            let open = j;
            while j < to {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
            if j < to {
                out.push((open, j + 1));
            }
        }
        j += 1;
    }
    out
}

fn build(code: &str, tokens: &[Token]) -> Result<Vec<SyntaxNode>, ParseError> {
    let mut nodes = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let text = &code[token.start..token.end];
        match &token.kind {
            Kind::Keyword if text == "def" || text == "class" => {
                let keyword = SyntaxNode::spanning(text, code, token.start, token.end);
                match tokens.get(i + 1) {
                    Some(next) if next.kind == Kind::Name => {
                        let kind = if text == "def" {
                            "function_definition"
                        } else {
                            "class_definition"
                        };
                        let name = SyntaxNode::spanning("identifier", code, next.start, next.end)
                            .with_field("name");
                        nodes.push(
                            SyntaxNode::spanning(kind, code, token.start, next.end)
                                .with_child(keyword)
                                .with_child(name),
                        );
                        i += 2;
                        continue;
                    }
                    _ => nodes.push(keyword),
                }
            }
            Kind::Keyword => {
                let kind = match text {
                    "True" => "true",
                    "False" => "false",
                    "None" => "none",
                    other => other,
                };
                nodes.push(SyntaxNode::spanning(kind, code, token.start, token.end));
            }
            Kind::Name => {
                let (node, next) = primary(code, tokens, i);
                nodes.push(node);
                i = next;
                continue;
            }
            Kind::Number => {
                let kind = if text.contains('.') { "float" } else { "integer" };
                nodes.push(SyntaxNode::spanning(kind, code, token.start, token.end));
            }
            Kind::Str { interpolations } => {
                let mut node = SyntaxNode::spanning("string", code, token.start, token.end);
                for &(open, close) in interpolations {
                    let inner = lex(code, open + 1, close - 1)?;
                    let mut field = SyntaxNode::spanning("interpolation", code, open, close);
                    field.children = build(code, &inner)?;
                    node.push_child(field);
                }
                nodes.push(node);
            }
            Kind::Comment => nodes.push(SyntaxNode::spanning("comment", code, token.start, token.end)),
            Kind::Punct(_) => {}
        }
        i += 1;
    }
    Ok(nodes)
}

/// A name followed by any number of `.name` segments.
fn primary(code: &str, tokens: &[Token], at: usize) -> (SyntaxNode, usize) {
    let first = &tokens[at];
    let mut node = SyntaxNode::spanning("identifier", code, first.start, first.end);
    let mut j = at + 1;

    while let (Some(dot), Some(name)) = (tokens.get(j), tokens.get(j + 1)) {
        if dot.kind != Kind::Punct(b'.') || name.kind != Kind::Name {
            break;
        }
        let attribute =
            SyntaxNode::spanning("identifier", code, name.start, name.end).with_field("attribute");
        node = SyntaxNode::spanning("attribute", code, node.start, name.end)
            .with_child(node.with_field("object"))
            .with_child(attribute);
        j += 2;
    }
    (node, j)
}
