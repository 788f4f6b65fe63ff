//! Value categories.
//!
//! The category of a maskable value decides which renderer produces its
//! token and which shape rules apply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// The semantic type of a maskable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Code identifier.
    Ident,
    /// Generic text token.
    Word,
    /// Email address.
    Email,
    /// URL with an `http`, `https` or `ftp` scheme.
    Url,
    /// UUID, hyphenated or bare.
    Uuid,
    /// Phone number.
    Phone,
    /// Numeric literal.
    Num,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Ident,
        Self::Word,
        Self::Email,
        Self::Url,
        Self::Uuid,
        Self::Phone,
        Self::Num,
    ];

    /// The canonical upper-case name (`IDENT`, `WORD`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ident => "IDENT",
            Self::Word => "WORD",
            Self::Email => "EMAIL",
            Self::Url => "URL",
            Self::Uuid => "UUID",
            Self::Phone => "PHONE",
            Self::Num => "NUM",
        }
    }

    /// Whether collisions are resolved by re-deriving the whole value rather
    /// than by appending a suffix.
    ///
    /// Appending to these would break the format the token has to keep.
    #[must_use]
    pub const fn is_fixed_format(&self) -> bool {
        matches!(self, Self::Uuid | Self::Phone | Self::Num)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TokenError::unsupported_category(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!("IDENT".parse::<Category>().unwrap(), Category::Ident);
        assert_eq!("email".parse::<Category>().unwrap(), Category::Email);
        assert_eq!(" num ".parse::<Category>().unwrap(), Category::Num);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "SSN".parse::<Category>().unwrap_err();
        assert_eq!(err, TokenError::unsupported_category("SSN"));
    }

    #[test]
    fn display_round_trips() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Category::Ident).unwrap();
        assert_eq!(json, "\"IDENT\"");
        let back: Category = serde_json::from_str("\"PHONE\"").unwrap();
        assert_eq!(back, Category::Phone);
    }
}
