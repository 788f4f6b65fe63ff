//! Keyed pseudorandom derivation.
//!
//! All token material comes from HMAC-SHA-256 keyed with the installation
//! secret. Inputs are `|`-joined parts, so `["ns", "orig"]` hashes the bytes
//! `ns|orig`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Lower-case ASCII letters.
pub const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Decimal digits.
pub const DIGITS: &[u8] = b"0123456789";

/// RFC 4648 base-32 alphabet, lower case.
pub const BASE32_LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";

/// RFC 4648 base-32 alphabet, upper case.
pub const BASE32_UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Lower-case hexadecimal digits.
pub const HEX: &[u8] = b"0123456789abcdef";

/// A keyed pseudorandom function over `|`-joined string parts.
#[derive(Clone)]
pub struct KeyedDigest {
    key: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for KeyedDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedDigest")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl KeyedDigest {
    /// Create a digest keyed with the given secret.
    #[must_use]
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: Zeroizing::new(key.to_vec()),
        }
    }

    /// HMAC-SHA-256 of the `|`-joined parts.
    #[must_use]
    pub fn digest(&self, parts: &[&str]) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC-SHA256 accepts keys of any length");
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                mac.update(b"|");
            }
            mac.update(part.as_bytes());
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    /// Map the digest of `parts` onto `alphabet`, producing `len` characters.
    ///
    /// Outputs longer than one digest block are extended with `#<block>`
    /// counter parts.
    #[must_use]
    pub fn render(&self, parts: &[&str], alphabet: &[u8], len: usize) -> String {
        debug_assert!(!alphabet.is_empty());
        let mut out = String::with_capacity(len);
        let mut block = 0u32;

        while out.len() < len {
            let bytes = if block == 0 {
                self.digest(parts)
            } else {
                let counter = format!("#{block}");
                let mut extended = parts.to_vec();
                extended.push(&counter);
                self.digest(&extended)
            };

            for byte in bytes.iter().take(len - out.len()) {
                out.push(char::from(alphabet[usize::from(*byte) % alphabet.len()]));
            }
            block += 1;
        }

        out
    }

    /// Pick a single character from `alphabet`.
    #[must_use]
    pub fn pick(&self, parts: &[&str], alphabet: &[u8]) -> char {
        let bytes = self.digest(parts);
        char::from(alphabet[usize::from(bytes[0]) % alphabet.len()])
    }
}
