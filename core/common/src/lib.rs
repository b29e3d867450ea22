//! Common utilities and types shared across PassVault modules.
//!
//! This module provides the error taxonomy, identifiers and the vault record
//! data model used by every other crate in the workspace.

pub mod account;
pub mod error;
pub mod record;
pub mod types;

pub use account::Account;
pub use error::{Error, Result};
pub use record::{
    PlainFields, RecordField, RecordFields, Sealed, SealedFields, StoredRecord, VaultRecord,
};
pub use types::{OwnerId, RecordId, SensitiveBytes};
