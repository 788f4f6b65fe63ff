//! Builder for [`Masker`].

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use veil_token::TokenGenerator;

use super::Masker;
use crate::config::{KdfConfig, MaskerConfig};
use crate::detect::PatternDetector;
use crate::error::Result;
use crate::store::{MappingStore, Secret, SecretProvider, SecretResolver, SecretSource};

/// Configures and opens a [`Masker`].
///
/// Without an explicit secret, the secret is resolved from the platform
/// provider and the fallback file (see [`SecretResolver`]). Without a store
/// path, the encrypted store lives in memory.
#[derive(Default)]
pub struct MaskerBuilder {
    config: MaskerConfig,
    secret: Option<Secret>,
    platform: Option<Arc<dyn SecretProvider>>,
    detector: Option<PatternDetector>,
}

impl std::fmt::Debug for MaskerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskerBuilder")
            .field("config", &self.config)
            .field("secret", &self.secret.is_some())
            .field("platform", &self.platform.as_ref().map(|p| p.name().to_string()))
            .finish_non_exhaustive()
    }
}

impl MaskerBuilder {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: MaskerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this secret instead of resolving one.
    #[must_use]
    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Persist mappings to `path`.
    #[must_use]
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = Some(path.into());
        self
    }

    /// Keep the encrypted store in memory.
    #[must_use]
    pub fn in_memory(mut self) -> Self {
        self.config.store.path = None;
        self
    }

    /// Fallback secret file.
    #[must_use]
    pub fn secret_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.secret.file = Some(path.into());
        self
    }

    /// Platform secret store, consulted before the fallback file.
    #[must_use]
    pub fn platform_provider(mut self, provider: Arc<dyn SecretProvider>) -> Self {
        self.platform = Some(provider);
        self
    }

    /// scrypt parameters for the store key.
    #[must_use]
    pub const fn kdf(mut self, kdf: KdfConfig) -> Self {
        self.config.store.kdf = kdf;
        self
    }

    /// Fail calls whose generation exhausts its retries.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.config.generation.strict = strict;
        self
    }

    /// Use a customized pattern detector for [`Masker::mask_detected`].
    #[must_use]
    pub fn detector(mut self, detector: PatternDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Resolve the secret, derive the store key and open the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the secret cannot be
    /// resolved, or key derivation fails.
    pub async fn build(self) -> Result<Masker> {
        self.config.validate()?;

        let mut resolver = SecretResolver::new();
        if let Some(platform) = self.platform {
            resolver = resolver.platform(platform);
        }
        if let Some(file) = &self.config.secret.file {
            resolver = resolver.file(file);
        }

        let (secret, secret_source) = match self.secret {
            Some(secret) => (secret, SecretSource::Provided),
            None => resolver.resolve().await?,
        };

        let kdf = self.config.store.kdf;
        let store = match &self.config.store.path {
            Some(path) => MappingStore::open(path, &secret, kdf).await?,
            None => MappingStore::in_memory(&secret, kdf).await?,
        };

        let generator = TokenGenerator::with_options(
            secret.as_bytes(),
            self.config.generation.generator_options(),
        );

        info!(
            secret = ?secret_source,
            persistent = store.path().is_some(),
            "masker ready"
        );

        Ok(Masker {
            store,
            generator,
            detector: self.detector.unwrap_or_default(),
            generation: self.config.generation,
            resolver,
            secret_source,
        })
    }
}
