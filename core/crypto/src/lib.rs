//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - Root key derivation from the configured passphrase using Argon2id
//! - The field cipher: self-contained XChaCha20-Poly1305 envelopes per value
//! - Account password hashing (Argon2id PHC strings)
//! - A random password generator
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Every sealed value uses a fresh salt and nonce

pub mod aead;
pub mod field;
pub mod generator;
pub mod kdf;
pub mod keys;
pub mod password;

pub use field::FieldCipher;
pub use generator::{generate_password, PasswordPolicy};
pub use kdf::{derive_key, KdfParams};
pub use keys::{FieldKey, RootKey, Salt};
pub use password::{hash_password, verify_password};
