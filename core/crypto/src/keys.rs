//! Key types with secure memory handling.
//!
//! All key types automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of the per-value salt mixed into each field key.
pub const FIELD_SALT_LENGTH: usize = 16;

/// Domain separation tag for field key derivation.
const FIELD_KEY_CONTEXT: &[u8] = b"passvault.field";

/// Root key derived from the configured encryption passphrase.
///
/// One root key serves the whole process. Every sealed value gets its own
/// field key derived from this root and a random salt.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RootKey {
    key: [u8; KEY_LENGTH],
}

impl RootKey {
    /// Create a root key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Derive the key for one sealed value.
    ///
    /// Uses blake2b keyed on the root, the value's salt and a context tag.
    pub fn derive_field_key(&self, salt: &[u8; FIELD_SALT_LENGTH]) -> FieldKey {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.key);
        hasher.update(salt);
        hasher.update(FIELD_KEY_CONTEXT);

        let result = hasher.finalize();
        let mut derived = [0u8; KEY_LENGTH];
        derived.copy_from_slice(&result);
        FieldKey::from_bytes(derived)
    }
}

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootKey([REDACTED])")
    }
}

/// Key for sealing a single field value.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FieldKey {
    key: [u8; KEY_LENGTH],
}

impl FieldKey {
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldKey([REDACTED])")
    }
}

/// Salt for root key derivation.
#[derive(Debug, Clone)]
pub struct Salt(pub [u8; 32]);

impl Salt {
    /// Fixed salt for deriving the process root key.
    ///
    /// The passphrase is a server secret shared by every record, so the salt
    /// only has to separate this use from any other Argon2 use of the same
    /// secret.
    pub const APPLICATION: Salt = Salt(*b"passvault/field-cipher/root-key!");

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Generate a random per-value salt.
pub fn generate_field_salt() -> [u8; FIELD_SALT_LENGTH] {
    let mut salt = [0u8; FIELD_SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}
