//! Field cipher: seals and opens single text values.
//!
//! A sealed value is a self-contained base64 string:
//!
//! ```text
//! base64( "PV1\0" || salt (16) || nonce (24) || ciphertext || tag (16) )
//! ```
//!
//! The salt selects a per-value key derived from the process root key, and
//! the nonce is random, so sealing the same text twice never yields the same
//! string.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::aead::{self, NONCE_SIZE, TAG_SIZE};
use crate::kdf::{derive_key, KdfParams};
use crate::keys::{generate_field_salt, RootKey, Salt, FIELD_SALT_LENGTH};
use passvault_common::{Error, Result, Sealed};

/// Envelope format marker.
const ENVELOPE_MAGIC: &[u8; 4] = b"PV1\0";

const HEADER_SIZE: usize = ENVELOPE_MAGIC.len() + FIELD_SALT_LENGTH;

/// Smallest possible envelope: header, nonce and tag around an empty value.
const MIN_ENVELOPE_SIZE: usize = HEADER_SIZE + NONCE_SIZE + TAG_SIZE;

/// Symmetric cipher applied independently to each record field.
///
/// Holds the process root key; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FieldCipher {
    root: RootKey,
}

impl FieldCipher {
    /// Create a cipher from an already derived root key.
    pub fn new(root: RootKey) -> Self {
        Self { root }
    }

    /// Derive the root key from the configured passphrase and build a cipher.
    ///
    /// # Errors
    /// - Passphrase empty
    /// - Invalid KDF parameters
    pub fn from_passphrase(passphrase: &[u8], params: &KdfParams) -> Result<Self> {
        let root = derive_key(passphrase, &Salt::APPLICATION, params)?;
        Ok(Self::new(root))
    }

    /// Seal a plaintext value.
    ///
    /// # Postconditions
    /// - The result opens to `plaintext` under the same root key
    /// - Fresh salt and nonce on every call
    ///
    /// # Errors
    /// - Underlying AEAD failure (not expected for any text input)
    pub fn seal(&self, plaintext: &str) -> Result<Sealed> {
        let salt = generate_field_salt();
        let key = self.root.derive_field_key(&salt);
        let body = aead::encrypt(&key, plaintext.as_bytes())?;

        let mut envelope = Vec::with_capacity(HEADER_SIZE + body.len());
        envelope.extend_from_slice(ENVELOPE_MAGIC);
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&body);

        Ok(Sealed::from_stored(STANDARD.encode(envelope)))
    }

    /// Open a sealed value.
    ///
    /// # Errors
    /// - `Error::Decryption` if the value is not an envelope
    /// - `Error::Decryption` if authentication fails (wrong key, tampering)
    /// - `Error::Decryption` if the recovered bytes are not UTF-8
    pub fn open(&self, sealed: &str) -> Result<String> {
        let envelope = decode_envelope(sealed)
            .ok_or_else(|| Error::Decryption("Value is not a sealed envelope".to_string()))?;

        let (header, body) = envelope.split_at(HEADER_SIZE);
        let mut salt = [0u8; FIELD_SALT_LENGTH];
        salt.copy_from_slice(&header[ENVELOPE_MAGIC.len()..]);

        let key = self.root.derive_field_key(&salt);
        let plaintext = aead::decrypt(&key, body)?;

        String::from_utf8(plaintext)
            .map_err(|_| Error::Decryption("Decrypted value is not UTF-8".to_string()))
    }

    /// Whether `value` has the shape of an envelope produced by [`seal`](Self::seal).
    ///
    /// Says nothing about whether this cipher's key can open it.
    pub fn is_sealed(value: &str) -> bool {
        decode_envelope(value).is_some()
    }
}

fn decode_envelope(value: &str) -> Option<Vec<u8>> {
    let bytes = STANDARD.decode(value).ok()?;
    if bytes.len() < MIN_ENVELOPE_SIZE || !bytes.starts_with(ENVELOPE_MAGIC) {
        return None;
    }
    Some(bytes)
}
