//! Configuration types for veil.
//!
//! Every section deserializes from TOML with defaults for missing fields, so
//! an empty file is a valid configuration. Environment variables (see
//! [`env::vars`]) are layered on top with [`MaskerConfig::apply_env`].

pub mod env;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use veil_token::{DEFAULT_CORE_LEN, DEFAULT_MAX_ATTEMPTS, GeneratorOptions};

pub use env::EnvConfig;

use self::env::vars;
use crate::error::{MaskError, Result};

/// File name of the encrypted mapping store inside the data directory.
pub const STORE_FILE_NAME: &str = "mappings.enc";

/// File name of the fallback secret inside the data directory.
pub const SECRET_FILE_NAME: &str = "secret.key";

/// Default scrypt cost exponent (N = 2^15).
pub const DEFAULT_KDF_LOG_N: u8 = 15;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskerConfig {
    /// Mapping store settings.
    pub store: StoreConfig,
    /// Secret resolution settings.
    pub secret: SecretConfig,
    /// Token generation settings.
    pub generation: GenerationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Mapping store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store file. `None` keeps the encrypted store in memory.
    pub path: Option<PathBuf>,
    /// Key derivation parameters.
    pub kdf: KdfConfig,
}

/// scrypt parameters for deriving the store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Cost exponent.
    pub log_n: u8,
    /// Block size.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            log_n: DEFAULT_KDF_LOG_N,
            r: 8,
            p: 1,
        }
    }
}

/// Secret resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Fallback secret file, used when no platform store is available.
    pub file: Option<PathBuf>,
}

/// Token generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Identifier token core length.
    pub core_len: usize,
    /// Anti-leakage retry bound.
    pub max_attempts: u32,
    /// Fail the call instead of accepting an exhausted candidate.
    pub strict: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            core_len: DEFAULT_CORE_LEN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            strict: false,
        }
    }
}

impl GenerationConfig {
    /// Generator options for these settings.
    #[must_use]
    pub const fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            core_len: self.core_len,
            max_attempts: self.max_attempts,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(MaskError::config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl MaskerConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has fields of
    /// the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| MaskError::config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            MaskError::io_context(format!("reading configuration {}", path.display()), e)
        })?;
        Self::from_toml_str(&contents)
    }

    /// Layer `VEIL_*` environment variables over this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable cannot be parsed.
    pub fn apply_env(mut self, env: &EnvConfig) -> Result<Self> {
        if let Some(path) = env.get(vars::STORE_PATH) {
            self.store.path = Some(PathBuf::from(path));
        }
        if let Some(path) = env.get(vars::SECRET_FILE) {
            self.secret.file = Some(PathBuf::from(path));
        }
        if env.is_set(vars::KDF_LOG_N) {
            self.store.kdf.log_n = required(env, vars::KDF_LOG_N)?;
        }
        if env.is_set(vars::CORE_LEN) {
            self.generation.core_len = required(env, vars::CORE_LEN)?;
        }
        if env.is_set(vars::MAX_ATTEMPTS) {
            self.generation.max_attempts = required(env, vars::MAX_ATTEMPTS)?;
        }
        if let Some(strict) = env.bool(vars::STRICT) {
            self.generation.strict = strict;
        }
        if let Some(filter) = env.get(vars::LOG) {
            self.logging.filter = filter;
        }
        if let Some(format) = env.get(vars::LOG_FORMAT) {
            self.logging.format = format.parse()?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Fill unset store and secret paths with the per-user data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no resolvable home directory.
    pub fn with_default_paths(mut self) -> Result<Self> {
        let dir = default_data_dir()
            .ok_or_else(|| MaskError::config("no per-user data directory on this platform"))?;
        if self.store.path.is_none() {
            self.store.path = Some(dir.join(STORE_FILE_NAME));
        }
        if self.secret.file.is_none() {
            self.secret.file = Some(dir.join(SECRET_FILE_NAME));
        }
        Ok(self)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.generation.core_len == 0 {
            return Err(MaskError::config("generation.core_len must be at least 1"));
        }
        if self.generation.max_attempts == 0 {
            return Err(MaskError::config("generation.max_attempts must be at least 1"));
        }
        let kdf = self.store.kdf;
        if kdf.log_n == 0 || kdf.log_n >= 64 || kdf.r == 0 || kdf.p == 0 {
            return Err(MaskError::config(format!(
                "invalid scrypt parameters log_n={} r={} p={}",
                kdf.log_n, kdf.r, kdf.p
            )));
        }
        Ok(())
    }
}

fn required<T: FromStr>(source: &EnvConfig, name: &str) -> Result<T> {
    source.parse(name).ok_or_else(|| {
        MaskError::config(format!(
            "environment variable {}_{name} has an invalid value",
            env::DEFAULT_PREFIX
        ))
    })
}

/// Per-user data directory for the store and fallback secret.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "veil", "veil").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = MaskerConfig::from_toml_str("").unwrap();
        assert_eq!(config, MaskerConfig::default());
        assert_eq!(config.generation.core_len, 12);
        assert_eq!(config.store.kdf.log_n, 15);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn partial_document() {
        let config = MaskerConfig::from_toml_str(
            r#"
            [store]
            path = "/var/lib/veil/mappings.enc"

            [generation]
            strict = true

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.path, Some(PathBuf::from("/var/lib/veil/mappings.enc")));
        assert!(config.generation.strict);
        assert_eq!(config.generation.max_attempts, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(MaskerConfig::from_toml_str("[generation]\ncore_len = 0").is_err());
        assert!(MaskerConfig::from_toml_str("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn env_layering() {
        let env = EnvConfig::default()
            .with_override(vars::CORE_LEN, "16")
            .with_override(vars::STRICT, "true")
            .with_override(vars::LOG_FORMAT, "pretty")
            .with_override(vars::STORE_PATH, "/tmp/m.enc");
        let config = MaskerConfig::default().apply_env(&env).unwrap();
        assert_eq!(config.generation.core_len, 16);
        assert!(config.generation.strict);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/m.enc")));
    }

    #[test]
    fn env_parse_error_is_config_error() {
        let env = EnvConfig::default().with_override(vars::MAX_ATTEMPTS, "many");
        let err = MaskerConfig::default().apply_env(&env).unwrap_err();
        assert!(matches!(err, MaskError::Config { .. }));
    }
}
