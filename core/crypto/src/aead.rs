//! Authenticated encryption using XChaCha20-Poly1305.
//!
//! XChaCha20-Poly1305 provides both confidentiality and authenticity,
//! with a 24-byte nonce that is safe for random generation.

use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng},
    XChaCha20Poly1305,
};

use crate::keys::FieldKey;
use passvault_common::{Error, Result};

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Encrypt plaintext under a field key.
///
/// # Postconditions
/// - Returns nonce || ciphertext || tag
/// - The nonce is randomly generated
///
/// # Errors
/// - Returns error if encryption fails
pub fn encrypt(key: &FieldKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypt nonce || ciphertext || tag under a field key.
///
/// # Errors
/// - Returns `Error::Decryption` if the input is too short
/// - Returns `Error::Decryption` if authentication fails (wrong key or tampering)
pub fn decrypt(key: &FieldKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::Decryption("Ciphertext too short".to_string()));
    }

    let (nonce_bytes, encrypted) = sealed.split_at(NONCE_SIZE);
    let nonce = GenericArray::from_slice(nonce_bytes);

    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));

    cipher
        .decrypt(nonce, encrypted)
        .map_err(|_| Error::Decryption("Authentication failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KEY_LENGTH;

    fn key(byte: u8) -> FieldKey {
        FieldKey::from_bytes([byte; KEY_LENGTH])
    }

    #[test]
    fn test_ciphertext_size() {
        let plaintext = b"Test message";
        let ciphertext = encrypt(&key(42), plaintext).unwrap();
        assert_eq!(ciphertext.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
    }

    #[test]
    fn test_wrong_key_fails() {
        let ciphertext = encrypt(&key(1), b"Secret data").unwrap();
        let result = decrypt(&key(2), &ciphertext);
        assert!(matches!(result, Err(Error::Decryption(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut ciphertext = encrypt(&key(42), b"Important data").unwrap();
        ciphertext[NONCE_SIZE + 5] ^= 0xFF;
        assert!(decrypt(&key(42), &ciphertext).is_err());
    }

    #[test]
    fn test_truncated_input_fails() {
        assert!(matches!(
            decrypt(&key(42), &[0u8; NONCE_SIZE]),
            Err(Error::Decryption(_))
        ));
    }
}
