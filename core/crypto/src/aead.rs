//! Authenticated encryption using AES-256-GCM.
//!
//! The cipher runs with a 16-byte nonce rather than the usual 12 bytes so
//! that sealed data keeps the `nonce(16) || ciphertext || tag(16)` layout
//! existing envelopes were written with.

use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng},
    aes::Aes256,
    AesGcm,
};
use tracing::debug;

use crate::keys::CipherKey;
use usercrypt_common::{Error, Result};

/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Nonce size (16 bytes).
pub const NONCE_SIZE: usize = 16;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Smallest valid sealed buffer: a nonce and a tag around empty ciphertext.
pub const MIN_SEALED_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypt plaintext using AES-256-GCM.
///
/// # Postconditions
/// - Returns nonce || ciphertext || tag
/// - The nonce is randomly generated from the OS RNG
/// - The output length is plaintext length + NONCE_SIZE + TAG_SIZE
///
/// # Errors
/// - Returns error if the underlying cipher fails
pub fn encrypt(key: &CipherKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let generated = Aes256Gcm16::generate_nonce(&mut OsRng);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&generated);

    let sealed = encrypt_with_nonce(key, &nonce, plaintext)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + sealed.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&sealed);

    Ok(result)
}

/// Encrypt plaintext with a specific nonce, returning ciphertext || tag.
///
/// # Warning
/// Reusing a nonce with the same key breaks both confidentiality and
/// authenticity. Only use this when the caller guarantees uniqueness.
pub fn encrypt_with_nonce(
    key: &CipherKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(key.as_bytes()));

    cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))
}

/// Decrypt data produced by [`encrypt`].
///
/// # Preconditions
/// - `sealed` must be at least MIN_SEALED_SIZE bytes
/// - Format: nonce || ciphertext || tag
///
/// # Errors
/// - Returns `InvalidEnvelope` if `sealed` is too short
/// - Returns `AuthenticationFailed` if the tag does not verify
///
/// # Security
/// - The tag is verified before any plaintext is returned
pub fn decrypt(key: &CipherKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < MIN_SEALED_SIZE {
        return Err(Error::InvalidEnvelope(format!(
            "expected at least {} bytes, got {}",
            MIN_SEALED_SIZE,
            sealed.len()
        )));
    }

    let (nonce, ciphertext_and_tag) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(key.as_bytes()));

    cipher
        .decrypt(GenericArray::from_slice(nonce), ciphertext_and_tag)
        .map_err(|_| {
            debug!("authentication tag rejected");
            Error::AuthenticationFailed
        })
}
