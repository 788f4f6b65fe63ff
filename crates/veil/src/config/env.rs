//! Environment-based configuration.

use std::collections::HashMap;

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "VEIL";

/// Environment variable reader.
///
/// Values set with [`EnvConfig::with_override`] shadow the process
/// environment, which keeps tests free of global state.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Values that take precedence over the process environment.
    overrides: HashMap<String, String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            overrides: HashMap::new(),
        }
    }

    /// Shadow a variable (name without prefix).
    #[must_use]
    pub fn with_override(mut self, name: &str, value: impl Into<String>) -> Self {
        self.overrides.insert(self.var_name(name), value.into());
        self
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        self.overrides
            .get(&var_name)
            .cloned()
            .or_else(|| std::env::var(&var_name).ok())
    }

    /// Get a parsed value.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Get a boolean value.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| {
            matches!(
                v.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enabled"
            )
        })
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Variables read by [`crate::config::MaskerConfig::apply_env`].
pub mod vars {
    /// Mapping store file.
    pub const STORE_PATH: &str = "STORE_PATH";
    /// Fallback secret file.
    pub const SECRET_FILE: &str = "SECRET_FILE";
    /// scrypt cost exponent.
    pub const KDF_LOG_N: &str = "KDF_LOG_N";
    /// Identifier token core length.
    pub const CORE_LEN: &str = "CORE_LEN";
    /// Anti-leakage retry bound.
    pub const MAX_ATTEMPTS: &str = "MAX_ATTEMPTS";
    /// Fail on exhausted generation.
    pub const STRICT: &str = "STRICT";
    /// Log filter directive.
    pub const LOG: &str = "LOG";
    /// Log output format.
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_prefixed() {
        let env = EnvConfig::new("VEIL_TEST_ENV").with_override("core_len", "16");
        assert_eq!(env.get("CORE_LEN").as_deref(), Some("16"));
        assert_eq!(env.parse::<usize>("core_len"), Some(16));
        assert!(!env.is_set("MAX_ATTEMPTS"));
    }

    #[test]
    fn bool_values() {
        let env = EnvConfig::new("VEIL_TEST_ENV")
            .with_override("A", "yes")
            .with_override("B", "0");
        assert_eq!(env.bool("A"), Some(true));
        assert_eq!(env.bool("B"), Some(false));
        assert_eq!(env.bool("C"), None);
    }
}
