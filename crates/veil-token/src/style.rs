//! Naming-style and composition detection for identifiers.

/// The naming convention an identifier follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingStyle {
    /// `camelCase`, including single lower-case words.
    Camel,
    /// `PascalCase`.
    Pascal,
    /// `snake_case`.
    Snake,
    /// `SCREAMING_SNAKE_CASE`, including single upper-case words.
    ScreamingSnake,
    /// Anything else (mixed separators, no letters, ...).
    Unknown,
}

impl NamingStyle {
    /// Detect the naming style of `name`.
    ///
    /// Leading underscores are ignored, so `_private_name` is snake case.
    #[must_use]
    pub fn detect(name: &str) -> Self {
        let body = name.trim_start_matches('_');
        let Some(first) = body.chars().find(|c| c.is_alphabetic()) else {
            return Self::Unknown;
        };

        let has_upper = body.chars().any(char::is_uppercase);
        let has_lower = body.chars().any(char::is_lowercase);
        let leads_with_letter = body.starts_with(first);

        if body.contains('_') {
            return match (has_upper, has_lower) {
                (false, true) => Self::Snake,
                (true, false) => Self::ScreamingSnake,
                _ => Self::Unknown,
            };
        }

        if !leads_with_letter {
            return Self::Unknown;
        }

        match (first.is_uppercase(), has_lower) {
            (false, _) => Self::Camel,
            (true, true) => Self::Pascal,
            (true, false) if body.chars().filter(|c| c.is_alphabetic()).count() > 1 => {
                Self::ScreamingSnake
            }
            (true, false) => Self::Pascal,
        }
    }
}

/// The letter/digit make-up of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composition {
    /// Only letters (separators ignored).
    Letters,
    /// Only digits (separators ignored).
    Digits,
    /// Letters and digits.
    Mixed,
}

impl Composition {
    /// Classify the alphanumeric characters of `value`.
    #[must_use]
    pub fn detect(value: &str) -> Self {
        let mut letters = false;
        let mut digits = false;
        for c in value.chars() {
            if c.is_ascii_digit() {
                digits = true;
            } else if c.is_alphabetic() {
                letters = true;
            }
        }

        match (letters, digits) {
            (false, true) => Self::Digits,
            (true, true) => Self::Mixed,
            _ => Self::Letters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_styles() {
        assert_eq!(NamingStyle::detect("myVariable"), NamingStyle::Camel);
        assert_eq!(NamingStyle::detect("name"), NamingStyle::Camel);
        assert_eq!(NamingStyle::detect("MyClassName"), NamingStyle::Pascal);
        assert_eq!(NamingStyle::detect("X"), NamingStyle::Pascal);
        assert_eq!(NamingStyle::detect("my_variable_name"), NamingStyle::Snake);
        assert_eq!(NamingStyle::detect("_private_name"), NamingStyle::Snake);
        assert_eq!(NamingStyle::detect("MAX_RETRIES"), NamingStyle::ScreamingSnake);
        assert_eq!(NamingStyle::detect("URL"), NamingStyle::ScreamingSnake);
        assert_eq!(NamingStyle::detect("Mixed_Case"), NamingStyle::Unknown);
        assert_eq!(NamingStyle::detect("1234"), NamingStyle::Unknown);
        assert_eq!(NamingStyle::detect("2fast"), NamingStyle::Unknown);
    }

    #[test]
    fn detect_composition() {
        assert_eq!(Composition::detect("customer_name"), Composition::Letters);
        assert_eq!(Composition::detect("1234"), Composition::Digits);
        assert_eq!(Composition::detect("user2"), Composition::Mixed);
        assert_eq!(Composition::detect("__"), Composition::Letters);
    }
}
