//! Storage backends for PassVault.
//!
//! This module provides trait-based interfaces for persisting vault records
//! and accounts, two implementations (in-memory and SQLite), and a registry
//! that resolves a backend by name and configuration.
//!
//! # Design Principles
//! - Owner scoping: every record query takes the owner id; there is no
//!   unscoped read or write
//! - Stores only ever see sealed fields; encryption happens above this layer
//! - Async operations: blocking database calls run off the async executor
//! - No retries: a failed call surfaces as `Error::Storage`

pub mod memory;
pub mod registry;
pub mod sqlite;
pub mod store;

#[cfg(test)]
pub(crate) mod conformance;

pub use memory::MemoryStore;
pub use registry::{create_default_registry, StoreFactory, StoreHandles, StoreRegistry};
pub use sqlite::SqliteStore;
pub use store::{AccountStore, RecordStore};
