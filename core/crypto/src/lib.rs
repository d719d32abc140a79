//! Cryptographic primitives for usercrypt.
//!
//! This module provides:
//! - Per-user key derivation using PBKDF2-HMAC-SHA256
//! - Key material normalization to 32-byte cipher keys
//! - Authenticated encryption using AES-256-GCM
//! - Base64 text envelopes for storing encrypted user data
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Key comparisons run in constant time

pub mod aead;
pub mod envelope;
pub mod kdf;
pub mod keys;

pub use envelope::{decrypt_bytes, decrypt_text, encrypt_bytes, encrypt_text, Envelope};
pub use kdf::{
    derive_key, derive_key_from_env, derive_key_hex, derive_key_with_config,
    derive_key_with_params, KdfParams, PBKDF2_ITERATIONS,
};
pub use keys::{CipherKey, DerivedKey, KEY_LENGTH};
