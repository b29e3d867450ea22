//! Engine assembly from configuration.

use std::sync::Arc;

use crate::accounts::AccountService;
use crate::config::EngineConfig;
use crate::gate::AccessGate;
use crate::service::VaultService;
use crate::transform::RecordTransformer;
use passvault_common::{Error, Result};
use passvault_crypto::FieldCipher;
use passvault_storage::{create_default_registry, StoreHandles};

/// The wired-up services sharing one gate, cipher and store.
#[derive(Clone)]
pub struct Engine {
    pub vault: VaultService,
    pub accounts: AccountService,
}

impl Engine {
    /// Build the engine described by `config`.
    ///
    /// Derives the field cipher's root key off the async executor and
    /// resolves the configured store backend. The store itself connects
    /// lazily on first use.
    ///
    /// # Errors
    /// - `Error::Configuration` if the store backend cannot be resolved
    /// - Key derivation failure
    pub async fn init(config: &EngineConfig) -> Result<Self> {
        let stores = create_default_registry()
            .resolve(&config.store.backend, config.store.options.clone())
            .map_err(|e| Error::Configuration(format!("Store backend: {}", e)))?;

        let secret = config.field_secret.clone();
        let kdf = config.kdf.clone();
        let cipher =
            tokio::task::spawn_blocking(move || FieldCipher::from_passphrase(secret.as_bytes(), &kdf))
                .await
                .map_err(|e| Error::Crypto(format!("Key derivation task failed: {}", e)))??;

        tracing::info!(
            store = %config.store.backend,
            token_ttl_secs = config.token_ttl.as_secs(),
            "Vault engine initialized"
        );
        Ok(Self::from_parts(AccessGate::from_config(config), cipher, stores))
    }

    /// Assemble an engine from already built parts.
    pub fn from_parts(gate: AccessGate, cipher: FieldCipher, stores: StoreHandles) -> Self {
        let gate = Arc::new(gate);
        let transformer = RecordTransformer::new(Arc::new(cipher));
        Self {
            vault: VaultService::new(gate.clone(), transformer, stores.records),
            accounts: AccountService::new(gate, stores.accounts),
        }
    }
}
