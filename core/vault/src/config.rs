//! Engine configuration.
//!
//! Secrets and settings are read once at startup, validated eagerly and then
//! passed explicitly into every component that needs them.

use serde_json::json;
use std::time::Duration;

use passvault_common::{Error, Result, SensitiveBytes};
use passvault_crypto::KdfParams;

/// Token signing secret. Required.
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
/// Field encryption passphrase. Required.
pub const ENV_CRYPTO_SECRET: &str = "CRYPTO_SECRET";
/// Bearer token lifetime in seconds.
pub const ENV_TOKEN_TTL_SECS: &str = "PASSVAULT_TOKEN_TTL_SECS";
/// Store backend name.
pub const ENV_STORE: &str = "PASSVAULT_STORE";
/// SQLite database path.
pub const ENV_DB_PATH: &str = "PASSVAULT_DB_PATH";
/// Argon2 preset for the root key.
pub const ENV_KDF: &str = "PASSVAULT_KDF";

/// Default bearer token lifetime (one day).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest accepted bearer token lifetime (ten years).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Default SQLite database path.
pub const DEFAULT_DB_PATH: &str = "passvault.db";

/// Which store backend to open, and its options.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Registry name ("memory", "sqlite").
    pub backend: String,
    /// Backend-specific options.
    pub options: serde_json::Value,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            backend: "memory".to_string(),
            options: serde_json::Value::Null,
        }
    }

    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: "sqlite".to_string(),
            options: json!({ "path": path.into() }),
        }
    }
}

/// Everything the engine needs to start.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Secret used to sign and verify bearer tokens.
    pub token_secret: SensitiveBytes,
    /// Passphrase the field cipher's root key is derived from.
    pub field_secret: SensitiveBytes,
    pub token_ttl: Duration,
    pub kdf: KdfParams,
    pub store: StoreConfig,
}

impl EngineConfig {
    /// Create a configuration with default settings.
    ///
    /// # Errors
    /// - `Error::Configuration` if either secret is empty
    pub fn new(token_secret: impl Into<String>, field_secret: impl Into<String>) -> Result<Self> {
        let token_secret = token_secret.into();
        let field_secret = field_secret.into();
        if token_secret.trim().is_empty() {
            return Err(missing(ENV_JWT_SECRET));
        }
        if field_secret.trim().is_empty() {
            return Err(missing(ENV_CRYPTO_SECRET));
        }

        Ok(Self {
            token_secret: SensitiveBytes::from(token_secret),
            field_secret: SensitiveBytes::from(field_secret),
            token_ttl: DEFAULT_TOKEN_TTL,
            kdf: KdfParams::default(),
            store: StoreConfig::sqlite(DEFAULT_DB_PATH),
        })
    }

    /// Set the store backend.
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Set the root key derivation parameters.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Set the bearer token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty or whitespace-only values count as unset. Secrets are used
    /// byte for byte; other settings are trimmed.
    ///
    /// # Errors
    /// - `Error::Configuration` if a required secret is missing
    /// - `Error::Configuration` if an optional setting is malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| missing(key))
        };
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::new(secret(ENV_JWT_SECRET)?, secret(ENV_CRYPTO_SECRET)?)?;

        if let Some(ttl) = read(ENV_TOKEN_TTL_SECS) {
            let secs: u64 = ttl.parse().map_err(|_| {
                Error::Configuration(format!("{} must be a number of seconds", ENV_TOKEN_TTL_SECS))
            })?;
            if secs == 0 {
                return Err(Error::Configuration(format!(
                    "{} must be greater than zero",
                    ENV_TOKEN_TTL_SECS
                )));
            }
            if secs > MAX_TOKEN_TTL.as_secs() {
                return Err(Error::Configuration(format!(
                    "{} must be at most {}",
                    ENV_TOKEN_TTL_SECS,
                    MAX_TOKEN_TTL.as_secs()
                )));
            }
            config.token_ttl = Duration::from_secs(secs);
        }

        if let Some(preset) = read(ENV_KDF) {
            config.kdf = KdfParams::from_name(&preset)
                .map_err(|e| Error::Configuration(format!("{}: {}", ENV_KDF, e)))?;
        }

        let db_path = read(ENV_DB_PATH).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        config.store = match read(ENV_STORE).as_deref() {
            None | Some("sqlite") => StoreConfig::sqlite(db_path),
            Some("memory") => StoreConfig::memory(),
            Some(other) => {
                return Err(Error::Configuration(format!(
                    "{}: unknown store backend '{}'",
                    ENV_STORE, other
                )))
            }
        };

        Ok(config)
    }
}

fn missing(key: &str) -> Error {
    Error::Configuration(format!("{} not defined", key))
}
