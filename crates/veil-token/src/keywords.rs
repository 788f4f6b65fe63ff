//! Reserved words of the languages identifier tokens are rendered into.

const PYTHON: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "match", "case", "nonlocal", "not", "or", "pass", "raise",
    "return", "try", "type", "while", "with", "yield",
];

const JAVASCRIPT: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

const JAVA: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "var", "record", "yield",
];

const GO: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

const RUST: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "type", "unsafe", "use", "where", "while", "yield",
];

const PHP: &[&str] = &[
    "abstract", "and", "array", "as", "break", "callable", "case", "catch", "class", "clone",
    "const", "continue", "declare", "default", "do", "echo", "else", "elseif", "empty",
    "enddeclare", "endfor", "endforeach", "endif", "endswitch", "endwhile", "enum", "eval",
    "exit", "extends", "final", "finally", "fn", "for", "foreach", "function", "global", "goto",
    "if", "implements", "include", "instanceof", "insteadof", "interface", "isset", "list",
    "match", "namespace", "new", "or", "print", "private", "protected", "public", "readonly",
    "require", "return", "static", "switch", "throw", "trait", "try", "unset", "use", "var",
    "while", "xor", "yield",
];

const RUBY: &[&str] = &[
    "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "defined?", "do",
    "else", "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not",
    "or", "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef",
    "unless", "until", "when", "while", "yield",
];

const C: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
];

const CPP_EXTRA: &[&str] = &[
    "bool", "catch", "class", "constexpr", "delete", "explicit", "false", "friend", "mutable",
    "namespace", "new", "noexcept", "nullptr", "operator", "private", "protected", "public",
    "template", "this", "throw", "true", "try", "typename", "using", "virtual",
];

const CSHARP: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Whether `word` is a reserved word of `language`.
///
/// Language names are matched case-insensitively (`"Python"`, `"ts"`, ...).
/// PHP keywords are case-insensitive; every other language compares exactly.
/// Unknown languages reserve nothing.
#[must_use]
pub fn is_reserved(language: &str, word: &str) -> bool {
    match language.to_ascii_lowercase().as_str() {
        "python" | "py" => PYTHON.contains(&word),
        "javascript" | "js" | "typescript" | "ts" | "tsx" | "jsx" => JAVASCRIPT.contains(&word),
        "java" => JAVA.contains(&word),
        "go" | "golang" => GO.contains(&word),
        "rust" | "rs" => RUST.contains(&word),
        "php" => PHP.iter().any(|k| k.eq_ignore_ascii_case(word)),
        "ruby" | "rb" => RUBY.contains(&word),
        "c" => C.contains(&word),
        "cpp" | "c++" | "cc" => C.contains(&word) || CPP_EXTRA.contains(&word),
        "csharp" | "c#" | "cs" => CSHARP.contains(&word),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_keywords() {
        assert!(is_reserved("python", "class"));
        assert!(is_reserved("Python", "None"));
        assert!(!is_reserved("python", "none"));
        assert!(!is_reserved("python", "customer"));
    }

    #[test]
    fn php_is_case_insensitive() {
        assert!(is_reserved("php", "FUNCTION"));
        assert!(!is_reserved("java", "CLASS"));
    }

    #[test]
    fn cpp_includes_c() {
        assert!(is_reserved("cpp", "struct"));
        assert!(is_reserved("cpp", "template"));
        assert!(!is_reserved("c", "template"));
    }

    #[test]
    fn unknown_language_reserves_nothing() {
        assert!(!is_reserved("cobol", "class"));
    }
}
