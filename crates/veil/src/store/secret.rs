//! Installation secret and where it lives.
//!
//! Resolution order: the platform provider (an OS keychain adapter supplied
//! by the caller), then the fallback file. If neither holds a secret, a new
//! one is generated and persisted to the first provider that accepts it. If
//! none does, the secret lives only for this process.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use rand::RngCore;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::SecretError;

/// Secret length in bytes.
pub const SECRET_LEN: usize = 32;

/// A 256-bit installation secret. Zeroed on drop.
#[derive(Clone)]
pub struct Secret(Zeroizing<[u8; SECRET_LEN]>);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for Secret {}

impl Secret {
    /// Generate a fresh random secret.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; SECRET_LEN]);
        rand::rng().fill_bytes(&mut bytes[..]);
        Self(bytes)
    }

    /// Wrap raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, SecretError> {
        let decoded = Zeroizing::new(
            hex::decode(hex_str.trim()).map_err(|e| SecretError::malformed(e.to_string()))?,
        );
        let bytes: [u8; SECRET_LEN] = decoded.as_slice().try_into().map_err(|_| {
            SecretError::malformed(format!(
                "expected {SECRET_LEN} bytes, found {}",
                decoded.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Hex encoding of the secret.
    #[must_use]
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.0[..]))
    }

    /// Raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

/// Where the secret in use came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Supplied directly by the caller.
    Provided,
    /// Loaded from the platform provider.
    Platform,
    /// Loaded from the fallback file.
    File(PathBuf),
    /// Newly generated and persisted.
    Generated {
        /// Name of the provider that accepted it.
        persisted_to: String,
    },
    /// Newly generated; no provider accepted it. Mappings made with it cannot
    /// be read by a later process.
    Ephemeral,
}

impl SecretSource {
    /// Whether the secret will survive this process.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        !matches!(self, Self::Ephemeral)
    }
}

/// A place the secret can be kept.
pub trait SecretProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Fetch the stored secret, `Ok(None)` if there is none.
    fn load(&self) -> BoxFuture<'_, Result<Option<Secret>, SecretError>>;

    /// Persist `secret`, replacing any previous one.
    fn store<'a>(&'a self, secret: &'a Secret) -> BoxFuture<'a, Result<(), SecretError>>;

    /// Remove the stored secret. Returns whether one existed.
    fn delete(&self) -> BoxFuture<'_, Result<bool, SecretError>>;
}

/// Keeps the secret as hex in an owner-only file.
#[derive(Debug, Clone)]
pub struct FileSecretProvider {
    path: PathBuf,
}

impl FileSecretProvider {
    /// Create a provider for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The secret file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretProvider for FileSecretProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> BoxFuture<'_, Result<Option<Secret>, SecretError>> {
        async move {
            match tokio::fs::read_to_string(&self.path).await {
                Ok(contents) => Secret::from_hex(&Zeroizing::new(contents)).map(Some),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(SecretError::io("reading secret file", &self.path, e)),
            }
        }
        .boxed()
    }

    fn store<'a>(&'a self, secret: &'a Secret) -> BoxFuture<'a, Result<(), SecretError>> {
        async move {
            super::write_private(&self.path, secret.to_hex().as_bytes())
                .await
                .map_err(|e| SecretError::io("writing secret file", &self.path, e))
        }
        .boxed()
    }

    fn delete(&self) -> BoxFuture<'_, Result<bool, SecretError>> {
        async move {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(SecretError::io("removing secret file", &self.path, e)),
            }
        }
        .boxed()
    }
}

/// Keeps the secret in process memory.
///
/// Stands in for a platform keychain in tests and for embedders that manage
/// the secret themselves. [`MemorySecretProvider::unavailable`] builds one
/// that rejects every call.
#[derive(Debug, Default)]
pub struct MemorySecretProvider {
    slot: Mutex<Option<Secret>>,
    unavailable: bool,
}

impl MemorySecretProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider already holding `secret`.
    #[must_use]
    pub fn with_secret(secret: Secret) -> Self {
        Self {
            slot: Mutex::new(Some(secret)),
            unavailable: false,
        }
    }

    /// Create a provider whose every operation fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            slot: Mutex::new(None),
            unavailable: true,
        }
    }

    /// Whether a secret is currently held.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn check(&self) -> Result<(), SecretError> {
        if self.unavailable {
            Err(SecretError::unavailable("memory", "provider disabled"))
        } else {
            Ok(())
        }
    }
}

impl SecretProvider for MemorySecretProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> BoxFuture<'_, Result<Option<Secret>, SecretError>> {
        async move {
            self.check()?;
            Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
        }
        .boxed()
    }

    fn store<'a>(&'a self, secret: &'a Secret) -> BoxFuture<'a, Result<(), SecretError>> {
        async move {
            self.check()?;
            *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(secret.clone());
            Ok(())
        }
        .boxed()
    }

    fn delete(&self) -> BoxFuture<'_, Result<bool, SecretError>> {
        async move {
            self.check()?;
            Ok(self
                .slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .is_some())
        }
        .boxed()
    }
}

/// Resolves the installation secret across the platform and file providers.
#[derive(Clone, Default)]
pub struct SecretResolver {
    platform: Option<Arc<dyn SecretProvider>>,
    file: Option<FileSecretProvider>,
}

impl fmt::Debug for SecretResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretResolver")
            .field("platform", &self.platform.as_ref().map(|p| p.name().to_string()))
            .field("file", &self.file)
            .finish()
    }
}

impl SecretResolver {
    /// Create a resolver with no providers (every secret is ephemeral).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the platform provider.
    #[must_use]
    pub fn platform(mut self, provider: Arc<dyn SecretProvider>) -> Self {
        self.platform = Some(provider);
        self
    }

    /// Set the fallback file.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(FileSecretProvider::new(path));
        self
    }

    /// Find or create the secret.
    ///
    /// Platform errors are logged and skipped. A fallback file that exists
    /// but does not hold a valid secret is an error: replacing it would
    /// orphan every stored mapping.
    pub async fn resolve(&self) -> Result<(Secret, SecretSource), SecretError> {
        if let Some(platform) = &self.platform {
            match platform.load().await {
                Ok(Some(secret)) => {
                    debug!(provider = platform.name(), "loaded secret");
                    return Ok((secret, SecretSource::Platform));
                }
                Ok(None) => {}
                Err(e) => warn!(provider = platform.name(), error = %e, "platform secret store unavailable"),
            }
        }

        if let Some(file) = &self.file {
            match file.load().await {
                Ok(Some(secret)) => {
                    debug!(path = %file.path().display(), "loaded secret from file");
                    return Ok((secret, SecretSource::File(file.path().to_path_buf())));
                }
                Ok(None) => {}
                Err(e @ SecretError::Malformed { .. }) => return Err(e),
                Err(e) => warn!(error = %e, "secret file unreadable"),
            }
        }

        let secret = Secret::generate();
        let source = self.persist(&secret).await;
        Ok((secret, source))
    }

    async fn persist(&self, secret: &Secret) -> SecretSource {
        let mut providers: Vec<&dyn SecretProvider> = Vec::with_capacity(2);
        if let Some(platform) = &self.platform {
            providers.push(platform.as_ref());
        }
        if let Some(file) = &self.file {
            providers.push(file);
        }

        for provider in providers {
            match provider.store(secret).await {
                Ok(()) => {
                    info!(provider = provider.name(), "generated and stored new secret");
                    return SecretSource::Generated {
                        persisted_to: provider.name().to_string(),
                    };
                }
                Err(e) => warn!(provider = provider.name(), error = %e, "could not persist secret"),
            }
        }

        warn!("secret is ephemeral; mappings will not be readable after this process exits");
        SecretSource::Ephemeral
    }

    /// Delete the secret from every provider. Returns whether any held one.
    pub async fn delete_all(&self) -> Result<bool, SecretError> {
        let mut existed = false;
        if let Some(platform) = &self.platform {
            existed |= platform.delete().await?;
        }
        if let Some(file) = &self.file {
            existed |= file.delete().await?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_and_validation() {
        let secret = Secret::from_bytes([7u8; SECRET_LEN]);
        assert_eq!(Secret::from_hex(&secret.to_hex()).unwrap(), secret);
        assert!(Secret::from_hex("abcd").is_err());
        assert!(Secret::from_hex("zz").is_err());
        assert_eq!(format!("{secret:?}"), "Secret([REDACTED])");
    }

    #[tokio::test]
    async fn platform_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let stored = Secret::generate();
        let resolver = SecretResolver::new()
            .platform(Arc::new(MemorySecretProvider::with_secret(stored.clone())))
            .file(dir.path().join("secret.key"));
        let (secret, source) = resolver.resolve().await.unwrap();
        assert_eq!(secret, stored);
        assert_eq!(source, SecretSource::Platform);
    }

    #[tokio::test]
    async fn generated_secret_falls_back_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secret.key");
        let resolver = SecretResolver::new()
            .platform(Arc::new(MemorySecretProvider::unavailable()))
            .file(&path);

        let (first, source) = resolver.resolve().await.unwrap();
        assert_eq!(
            source,
            SecretSource::Generated {
                persisted_to: "file".to_string()
            }
        );

        let (again, source) = resolver.resolve().await.unwrap();
        assert_eq!(again, first);
        assert_eq!(source, SecretSource::File(path.clone()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn no_providers_is_ephemeral() {
        let (_, source) = SecretResolver::new().resolve().await.unwrap();
        assert_eq!(source, SecretSource::Ephemeral);
        assert!(!source.is_durable());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.key");
        std::fs::write(&path, "not hex").unwrap();
        let err = SecretResolver::new().file(&path).resolve().await.unwrap_err();
        assert!(matches!(err, SecretError::Malformed { .. }));
    }

    #[tokio::test]
    async fn delete_all_clears_every_provider() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Arc::new(MemorySecretProvider::new());
        let resolver = SecretResolver::new()
            .platform(platform.clone())
            .file(dir.path().join("secret.key"));
        resolver.resolve().await.unwrap();
        assert!(platform.is_populated());

        assert!(resolver.delete_all().await.unwrap());
        assert!(!platform.is_populated());
        assert!(!resolver.delete_all().await.unwrap());
    }
}
