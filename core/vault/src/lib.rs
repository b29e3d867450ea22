//! Vault engine for PassVault.
//!
//! This module provides:
//! - Configuration loading and validation
//! - The access gate (bearer token verification and issuance)
//! - The record transformer (field-level sealing and opening)
//! - Authenticated vault record operations and account management
//!
//! # Architecture
//! The engine sits between the HTTP surface and the store backends. Callers
//! hand it a raw authorization header and plaintext fields; the store only
//! ever sees the verified owner id and sealed fields.

pub mod accounts;
pub mod config;
pub mod engine;
pub mod gate;
pub mod service;
pub mod transform;

pub use accounts::AccountService;
pub use config::{EngineConfig, StoreConfig};
pub use engine::Engine;
pub use gate::AccessGate;
pub use service::VaultService;
pub use transform::{FieldOutcome, RecordTransformer};
