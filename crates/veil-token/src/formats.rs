//! Per-category token renderers.

use crate::category::Category;
use crate::digest::{BASE32_LOWER, BASE32_UPPER, DIGITS, HEX, KeyedDigest, LETTERS};
use crate::style::{Composition, NamingStyle};

/// Fixed marker in front of every `WORD` token.
pub(crate) const WORD_PREFIX: &str = "MASKWORD_";

const NON_ZERO: &[u8] = b"123456789";
const NANP_LEAD: &[u8] = b"23456789";
const UUID_VARIANT: &[u8] = b"89ab";

const EMAIL_USER_LEN: usize = 10;
const EMAIL_DOMAIN_LEN: usize = 8;
const URL_DOMAIN_LEN: usize = 10;
const URL_PATH_LEN: usize = 8;
const TLD_LEN: usize = 3;

const URL_SCHEMES: [&str; 3] = ["https", "http", "ftp"];

/// Everything a renderer needs to derive one candidate.
pub(crate) struct Seed<'a> {
    pub digest: &'a KeyedDigest,
    pub category: Category,
    pub namespace: &'a str,
    pub language: &'a str,
    pub original: &'a str,
    /// Empty on the first attempt, then the attempt/regeneration counter.
    pub salt: &'a str,
}

impl Seed<'_> {
    fn parts<'p>(&'p self, part: &'p str) -> Vec<&'p str> {
        let mut parts = match self.category {
            Category::Ident => vec![self.namespace, self.language, self.original],
            other => vec![other.as_str(), self.namespace, self.original],
        };
        if !part.is_empty() {
            parts.push(part);
        }
        if !self.salt.is_empty() {
            parts.push(self.salt);
        }
        parts
    }

    fn render(&self, part: &str, alphabet: &[u8], len: usize) -> String {
        self.digest.render(&self.parts(part), alphabet, len)
    }

    fn pick(&self, part: &str, alphabet: &[u8]) -> char {
        self.digest.pick(&self.parts(part), alphabet)
    }
}

/// Derive one candidate token for `seed`.
pub(crate) fn render(seed: &Seed<'_>, core_len: usize) -> String {
    match seed.category {
        Category::Ident => ident(seed, core_len),
        Category::Word => format!(
            "{WORD_PREFIX}{}",
            seed.render("", BASE32_UPPER, core_len.max(1))
        ),
        Category::Email => email(seed),
        Category::Url => url(seed),
        Category::Uuid => uuid(seed),
        Category::Phone => phone(seed),
        Category::Num => number(seed),
    }
}

/// The part of `token` that the leakage check inspects.
///
/// Markers every token of the category carries regardless of the original
/// are excluded.
pub(crate) fn checked_region(category: Category, token: &str) -> &str {
    match category {
        Category::Word => token.strip_prefix(WORD_PREFIX).unwrap_or(token),
        Category::Url => token.find("://").map_or(token, |i| &token[i + 3..]),
        _ => token,
    }
}

/// Append the disambiguating counter `n` where the format allows it.
pub(crate) fn with_suffix(category: Category, token: &str, n: u64) -> String {
    match category {
        Category::Word => format!("{token}_x{n}"),
        Category::Email => match token.split_once('@') {
            Some((user, domain)) => format!("{user}{n}@{domain}"),
            None => format!("{token}{n}"),
        },
        Category::Url => {
            let host_start = token.find("://").map_or(0, |i| i + 3);
            match token[host_start..].find('.') {
                Some(dot) => {
                    let at = host_start + dot;
                    format!("{}{n}{}", &token[..at], &token[at..])
                }
                None => format!("{token}{n}"),
            }
        }
        _ => format!("{token}{n}"),
    }
}

fn ident(seed: &Seed<'_>, core_len: usize) -> String {
    let alphabet = match Composition::detect(seed.original) {
        Composition::Letters => LETTERS,
        Composition::Digits => DIGITS,
        Composition::Mixed => BASE32_LOWER,
    };
    let core = seed.render("", alphabet, core_len.max(1));

    // The `v`/`V` lead keeps digits-only cores valid identifiers.
    match NamingStyle::detect(seed.original) {
        NamingStyle::Camel | NamingStyle::Unknown => format!("v{}", capitalize(&core)),
        NamingStyle::Pascal => format!("V{}", capitalize(&core)),
        NamingStyle::Snake => format!("v_{core}"),
        NamingStyle::ScreamingSnake => format!("V_{}", core.to_ascii_uppercase()),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut out = String::with_capacity(s.len());
        out.push(first.to_ascii_uppercase());
        out.push_str(chars.as_str());
        out
    })
}

fn email(seed: &Seed<'_>) -> String {
    format!(
        "{}@{}.{}",
        seed.render("user", LETTERS, EMAIL_USER_LEN),
        seed.render("domain", LETTERS, EMAIL_DOMAIN_LEN),
        seed.render("tld", LETTERS, TLD_LEN),
    )
}

fn url(seed: &Seed<'_>) -> String {
    let lower = seed.original.to_ascii_lowercase();
    let scheme = URL_SCHEMES
        .into_iter()
        .find(|s| lower.starts_with(s) && lower[s.len()..].starts_with("://"));
    let rest = scheme.map_or(seed.original, |s| &seed.original[s.len() + 3..]);
    let has_path = rest.find('/').is_some_and(|i| rest.len() > i + 1);

    let mut out = String::new();
    if let Some(scheme) = scheme {
        out.push_str(scheme);
        out.push_str("://");
    }
    out.push_str(&seed.render("domain", LETTERS, URL_DOMAIN_LEN));
    out.push('.');
    out.push_str(&seed.render("tld", LETTERS, TLD_LEN));
    if has_path {
        out.push('/');
        out.push_str(&seed.render("path", LETTERS, URL_PATH_LEN));
    }
    out
}

fn uuid(seed: &Seed<'_>) -> String {
    let hyphenated = seed.original.contains('-');
    let upper = seed.original.chars().any(|c| c.is_ascii_uppercase())
        && !seed.original.chars().any(|c| c.is_ascii_lowercase());
    let width = if hyphenated {
        32
    } else {
        seed.original
            .chars()
            .filter(char::is_ascii_hexdigit)
            .count()
            .max(1)
    };

    let mut out = String::with_capacity(width + 4);
    for i in 0..width {
        if hyphenated && matches!(i, 8 | 12 | 16 | 20) {
            out.push('-');
        }
        let digit = match (width, i) {
            (32, 12) => '4',
            (32, 16) => seed.pick(&format!("h{i}"), UUID_VARIANT),
            _ => seed.pick(&format!("h{i}"), HEX),
        };
        out.push(digit);
    }

    if upper { out.to_ascii_uppercase() } else { out }
}

fn phone(seed: &Seed<'_>) -> String {
    let chars: Vec<char> = seed.original.chars().collect();
    let international = seed.original.trim_start().starts_with('+');

    let mut out = String::with_capacity(seed.original.len());
    let mut digit_index = 0usize;
    let mut run_index = 0usize;
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let run_len = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
        for pos in 0..run_len {
            let alphabet = phone_digit_alphabet(run_index, run_len, pos, international);
            out.push(seed.pick(&format!("d{digit_index}"), alphabet));
            digit_index += 1;
        }
        run_index += 1;
        i += run_len;
    }

    out
}

/// Area codes and exchanges never start with 0 or 1; country codes never
/// start with 0.
fn phone_digit_alphabet(run: usize, run_len: usize, pos: usize, international: bool) -> &'static [u8] {
    if international && run == 0 {
        return if pos == 0 { NON_ZERO } else { DIGITS };
    }
    match (run_len, pos) {
        (3 | 7 | 10, 0) | (10, 3) => NANP_LEAD,
        _ => DIGITS,
    }
}

fn number(seed: &Seed<'_>) -> String {
    let int_len = seed
        .original
        .trim_start_matches(['+', '-'])
        .chars()
        .take_while(char::is_ascii_digit)
        .count();

    let mut out = String::with_capacity(seed.original.len());
    let mut digit_index = 0usize;
    for c in seed.original.chars() {
        if c.is_ascii_digit() {
            let alphabet = if digit_index == 0 && int_len > 1 {
                NON_ZERO
            } else {
                DIGITS
            };
            out.push(seed.pick(&format!("d{digit_index}"), alphabet));
            digit_index += 1;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed<'a>(digest: &'a KeyedDigest, category: Category, original: &'a str) -> Seed<'a> {
        Seed {
            digest,
            category,
            namespace: "ns",
            language: "",
            original,
            salt: "",
        }
    }

    #[test]
    fn ident_styles() {
        let d = KeyedDigest::new(b"k");
        let camel = render(&seed(&d, Category::Ident, "customerName"), 12);
        assert!(camel.starts_with('v'));
        assert!(camel.chars().nth(1).unwrap().is_ascii_uppercase());
        assert_eq!(camel.len(), 13);

        let snake = render(&seed(&d, Category::Ident, "customer_name"), 12);
        assert!(snake.starts_with("v_"));
        assert!(snake[2..].chars().all(|c| c.is_ascii_lowercase()));

        let screaming = render(&seed(&d, Category::Ident, "API_KEY"), 12);
        assert!(screaming.starts_with("V_"));
        assert!(screaming[2..].chars().all(|c| c.is_ascii_uppercase()));

        let digits = render(&seed(&d, Category::Ident, "1234"), 12);
        assert!(digits.starts_with('v'));
        assert!(digits[1..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn word_prefix() {
        let d = KeyedDigest::new(b"k");
        let word = render(&seed(&d, Category::Word, "secret"), 12);
        assert!(word.starts_with(WORD_PREFIX));
        assert_eq!(word.len(), WORD_PREFIX.len() + 12);
    }

    #[test]
    fn url_keeps_scheme_and_path_presence() {
        let d = KeyedDigest::new(b"k");
        let with_path = render(&seed(&d, Category::Url, "HTTPS://example.com/a/b"), 12);
        assert!(with_path.starts_with("https://"));
        assert_eq!(with_path.matches('/').count(), 3);

        let bare = render(&seed(&d, Category::Url, "ftp://files.example.org/"), 12);
        assert!(bare.starts_with("ftp://"));
        assert_eq!(bare.matches('/').count(), 2);

        let schemeless = render(&seed(&d, Category::Url, "www.example.com"), 12);
        assert!(!schemeless.contains("://"));
    }

    #[test]
    fn uuid_shapes() {
        let d = KeyedDigest::new(b"k");
        let hyphenated = render(
            &seed(&d, Category::Uuid, "123e4567-e89b-12d3-a456-426614174000"),
            12,
        );
        assert_eq!(hyphenated.len(), 36);
        assert_eq!(&hyphenated[14..15], "4");
        assert!("89ab".contains(&hyphenated[19..20]));

        let bare = render(&seed(&d, Category::Uuid, "123E4567E89B12D3A456426614174000"), 12);
        assert_eq!(bare.len(), 32);
        assert!(!bare.contains('-'));
        assert!(!bare.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn phone_skeleton() {
        let d = KeyedDigest::new(b"k");
        let token = render(&seed(&d, Category::Phone, "+1 (555) 123-4567"), 12);
        let skeleton: String = token
            .chars()
            .map(|c| if c.is_ascii_digit() { '#' } else { c })
            .collect();
        assert_eq!(skeleton, "+# (###) ###-####");
        assert!(!token[1..2].starts_with('0'));
        assert!(matches!(&token[4..5], "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9"));
    }

    #[test]
    fn number_shape() {
        let d = KeyedDigest::new(b"k");
        let token = render(&seed(&d, Category::Num, "-1234.50"), 12);
        assert_eq!(token.len(), 8);
        assert!(token.starts_with('-'));
        assert_eq!(token.find('.'), Some(5));
        assert_ne!(&token[1..2], "0");
    }

    #[test]
    fn suffixes_keep_format() {
        assert_eq!(with_suffix(Category::Ident, "vAbc", 2), "vAbc2");
        assert_eq!(with_suffix(Category::Word, "MASKWORD_AB", 3), "MASKWORD_AB_x3");
        assert_eq!(with_suffix(Category::Email, "ab@cd.ef", 2), "ab2@cd.ef");
        assert_eq!(
            with_suffix(Category::Url, "https://abc.def/gh", 4),
            "https://abc4.def/gh"
        );
    }

    #[test]
    fn checked_region_strips_markers() {
        assert_eq!(checked_region(Category::Word, "MASKWORD_ABC"), "ABC");
        assert_eq!(checked_region(Category::Url, "https://abc.def"), "abc.def");
        assert_eq!(checked_region(Category::Ident, "v_abc"), "v_abc");
    }
}
