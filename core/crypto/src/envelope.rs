//! Text envelopes: base64-encoded `nonce || ciphertext || tag`.
//!
//! The envelope carries no version byte or metadata. Anything written by
//! [`encrypt_text`] decrypts with [`decrypt_text`] given the same key
//! material.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::aead::{self, MIN_SEALED_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::keys::CipherKey;
use usercrypt_common::{Error, Result};

/// Decoded envelope bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    bytes: Vec<u8>,
}

impl Envelope {
    /// Wrap raw envelope bytes.
    ///
    /// # Errors
    /// - Returns `InvalidEnvelope` if shorter than a nonce plus a tag
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < MIN_SEALED_SIZE {
            return Err(Error::InvalidEnvelope(format!(
                "too short: expected at least {} bytes, got {}",
                MIN_SEALED_SIZE,
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    /// Decode a base64 envelope.
    ///
    /// # Errors
    /// - Returns `InvalidEnvelope` if the input is not standard base64
    /// - Returns `InvalidEnvelope` if the decoded data is too short
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::InvalidEnvelope(format!("not valid base64: {}", e)))?;
        Self::from_bytes(bytes)
    }

    /// Encode as standard padded base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn nonce(&self) -> &[u8] {
        &self.bytes[..NONCE_SIZE]
    }

    /// Ciphertext between nonce and tag. Empty for empty plaintext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.bytes[NONCE_SIZE..self.bytes.len() - TAG_SIZE]
    }

    pub fn tag(&self) -> &[u8] {
        &self.bytes[self.bytes.len() - TAG_SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encrypt bytes under normalized key material, returning an envelope.
pub fn encrypt_bytes(plaintext: &[u8], key_material: &str) -> Result<Envelope> {
    let key = CipherKey::from_material(key_material);
    Envelope::from_bytes(aead::encrypt(&key, plaintext)?)
}

/// Decrypt an envelope under normalized key material.
///
/// # Errors
/// - Returns `AuthenticationFailed` on a wrong key or tampered envelope
pub fn decrypt_bytes(envelope: &Envelope, key_material: &str) -> Result<Vec<u8>> {
    let key = CipherKey::from_material(key_material);
    aead::decrypt(&key, envelope.as_bytes())
}

/// Encrypt a string, returning a base64 envelope.
///
/// Key material may be 64 hex characters, a 32-byte string, or any other
/// string (hashed to 32 bytes). See [`CipherKey::from_material`].
pub fn encrypt_text(plaintext: &str, key_material: &str) -> Result<String> {
    encrypt_bytes(plaintext.as_bytes(), key_material).map(|envelope| envelope.to_base64())
}

/// Decrypt a base64 envelope produced by [`encrypt_text`].
///
/// # Errors
/// - Returns `InvalidEnvelope` if the envelope is malformed or truncated
/// - Returns `AuthenticationFailed` on a wrong key or tampered envelope
/// - Returns `InvalidEnvelope` if the authenticated plaintext is not UTF-8
pub fn decrypt_text(envelope: &str, key_material: &str) -> Result<String> {
    let envelope = Envelope::from_base64(envelope)?;
    let plaintext = decrypt_bytes(&envelope, key_material)?;

    String::from_utf8(plaintext)
        .map_err(|_| Error::InvalidEnvelope("plaintext is not valid UTF-8".to_string()))
}
