//! At-rest encryption of the record set.
//!
//! Layout: `nonce:tag:ciphertext`, each part lower-case hex. The nonce is 12
//! random bytes drawn per write and the tag is the 16-byte GCM tag.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::config::KdfConfig;
use crate::error::StoreError;

/// Fixed scrypt salt. The secret is already high-entropy; the salt only
/// separates this use of it from others.
const KDF_SALT: &[u8] = b"veil-mapping-store-v1";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES-256 key for the mapping store.
pub struct StoreKey(Zeroizing<[u8; 32]>);

impl std::fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StoreKey([REDACTED])")
    }
}

impl StoreKey {
    /// Derive the key from secret material. Blocks for the scrypt duration.
    pub fn derive(secret: &[u8], kdf: KdfConfig) -> Result<Self, StoreError> {
        let params = scrypt::Params::new(kdf.log_n, kdf.r, kdf.p, 32)
            .map_err(|e| StoreError::key_derivation(e.to_string()))?;
        let mut key = Zeroizing::new([0u8; 32]);
        scrypt::scrypt(secret, KDF_SALT, &params, &mut key[..])
            .map_err(|e| StoreError::key_derivation(e.to_string()))?;
        Ok(Self(key))
    }

    /// Derive the key on the blocking pool.
    pub async fn derive_async(
        secret: Zeroizing<Vec<u8>>,
        kdf: KdfConfig,
    ) -> Result<Self, StoreError> {
        tokio::task::spawn_blocking(move || Self::derive(&secret, kdf)).await?
    }

    fn cipher(&self) -> Result<Aes256Gcm, StoreError> {
        Aes256Gcm::new_from_slice(&self.0[..]).map_err(|e| StoreError::encrypt(e.to_string()))
    }
}

/// Encrypt `plaintext` into the colon-joined hex layout.
pub fn seal(key: &StoreKey, plaintext: &[u8]) -> Result<String, StoreError> {
    let cipher = key.cipher()?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| StoreError::encrypt(e.to_string()))?;
    // aes-gcm appends the tag to the ciphertext
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    Ok(format!(
        "{}:{}:{}",
        hex::encode(nonce_bytes),
        hex::encode(tag),
        hex::encode(ciphertext)
    ))
}

/// Decrypt and verify a payload produced by [`seal`].
pub fn open(key: &StoreKey, payload: &str) -> Result<Zeroizing<Vec<u8>>, StoreError> {
    let mut parts = payload.trim().split(':');
    let (Some(nonce_hex), Some(tag_hex), Some(ct_hex), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(StoreError::decrypt("expected nonce:tag:ciphertext"));
    };

    let decode = |label: &str, part: &str| {
        hex::decode(part).map_err(|e| StoreError::decrypt(format!("{label} is not hex: {e}")))
    };
    let nonce_bytes = decode("nonce", nonce_hex)?;
    let tag = decode("tag", tag_hex)?;
    let mut sealed = decode("ciphertext", ct_hex)?;

    if nonce_bytes.len() != NONCE_LEN {
        return Err(StoreError::decrypt(format!("nonce is {} bytes", nonce_bytes.len())));
    }
    if tag.len() != TAG_LEN {
        return Err(StoreError::decrypt(format!("tag is {} bytes", tag.len())));
    }
    sealed.extend_from_slice(&tag);

    let plaintext = key
        .cipher()?
        .decrypt(Nonce::from_slice(&nonce_bytes), sealed.as_ref())
        .map_err(|_| StoreError::decrypt("authentication failed"))?;
    Ok(Zeroizing::new(plaintext))
}
