//! Store registry for resolving a backend by name.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::store::{AccountStore, RecordStore};
use passvault_common::{Error, Result};

/// The two store interfaces produced by one backend.
///
/// Both handles usually point at the same underlying object.
#[derive(Clone)]
pub struct StoreHandles {
    pub records: Arc<dyn RecordStore>,
    pub accounts: Arc<dyn AccountStore>,
}

impl StoreHandles {
    /// Build handles from a backend implementing both store traits.
    pub fn from_backend<S>(backend: S) -> Self
    where
        S: RecordStore + AccountStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            records: backend.clone(),
            accounts: backend,
        }
    }
}

/// Factory function type for creating backends.
pub type StoreFactory = Box<dyn Fn(Value) -> Result<StoreHandles> + Send + Sync>;

/// Registry for store backend factories.
pub struct StoreRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl StoreRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: StoreFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Store backend '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a backend by name and configuration.
    ///
    /// # Errors
    /// - Backend not registered
    /// - Configuration invalid for the backend
    pub fn resolve(&self, name: &str, config: Value) -> Result<StoreHandles> {
        let factory = self.factories.get(name).ok_or_else(|| {
            Error::NotFound(format!("Store backend '{}' is not registered", name))
        })?;
        factory(config)
    }

    /// Get list of registered backend names.
    pub fn backends(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in backends.
///
/// - `memory`: no configuration
/// - `sqlite`: `{"path": "<database file>"}`
pub fn create_default_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();

    registry
        .register(
            "memory",
            Box::new(|_config| Ok(StoreHandles::from_backend(crate::memory::MemoryStore::new()))),
        )
        .expect("Failed to register memory store");

    registry
        .register(
            "sqlite",
            Box::new(|config| {
                let path = config
                    .get("path")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        Error::InvalidInput("SQLite store requires 'path'".to_string())
                    })?;
                Ok(StoreHandles::from_backend(crate::sqlite::SqliteStore::new(path)))
            }),
        )
        .expect("Failed to register sqlite store");

    registry
}
