//! Key types with secure memory handling.
//!
//! All key types automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory.

use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of a key rendered as hex.
pub const HEX_KEY_LENGTH: usize = KEY_LENGTH * 2;

/// Key derived from a user identifier and the server secret.
///
/// Never persisted; recomputed on every use.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a derived key from raw bytes.
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

    /// Render the key as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.key)
    }

    /// Convert into a key usable by the cipher.
    pub fn to_cipher_key(&self) -> CipherKey {
        CipherKey::from_bytes(self.key)
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED])")
    }
}

/// Normalized 32-byte key fed to the cipher.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    key: [u8; KEY_LENGTH],
}

impl CipherKey {
    /// Create a cipher key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Normalize caller-supplied key material to exactly 32 bytes.
    ///
    /// Rules are checked in order:
    /// 1. 64 hex characters (either case) are decoded.
    /// 2. A string whose UTF-8 encoding is exactly 32 bytes is used verbatim.
    /// 3. Anything else is hashed with SHA-256.
    ///
    /// The precedence must not change: envelopes produced under any of the
    /// branches only decrypt with the same normalization.
    pub fn from_material(material: &str) -> Self {
        let mut key = [0u8; KEY_LENGTH];

        if material.len() == HEX_KEY_LENGTH && hex::decode_to_slice(material, &mut key).is_ok() {
            return Self { key };
        }

        let bytes = material.as_bytes();
        if bytes.len() == KEY_LENGTH {
            key.copy_from_slice(bytes);
        } else {
            key.copy_from_slice(&Sha256::digest(bytes));
        }

        Self { key }
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl From<&DerivedKey> for CipherKey {
    fn from(key: &DerivedKey) -> Self {
        key.to_cipher_key()
    }
}

impl PartialEq for CipherKey {
    fn eq(&self, other: &Self) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl Eq for CipherKey {}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_material_is_decoded() {
        let key = CipherKey::from_material(&"0123456789abcdef".repeat(4));

        assert_eq!(key.as_bytes()[..8], [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]);
    }

    #[test]
    fn test_hex_material_is_case_insensitive() {
        let lower = CipherKey::from_material(&"ab".repeat(32));
        let upper = CipherKey::from_material(&"AB".repeat(32));

        assert_eq!(lower, upper);
        assert_eq!(lower.as_bytes(), &[0xABu8; KEY_LENGTH]);
    }

    #[test]
    fn test_raw_32_byte_material_used_verbatim() {
        let material = "abcdefghijklmnopqrstuvwxyz012345";
        let key = CipherKey::from_material(material);

        assert_eq!(key.as_bytes(), material.as_bytes());
    }

    #[test]
    fn test_multibyte_material_uses_byte_length() {
        // 16 two-byte characters: 16 chars but 32 bytes.
        let material = "é".repeat(16);
        let key = CipherKey::from_material(&material);

        assert_eq!(key.as_bytes(), material.as_bytes());
    }

    #[test]
    fn test_other_material_is_hashed() {
        let key = CipherKey::from_material("password");

        assert_eq!(
            hex::encode(key.as_bytes()),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_64_chars_non_hex_is_hashed() {
        let material = "z".repeat(64);
        let key = CipherKey::from_material(&material);

        assert_eq!(key.as_bytes()[..], Sha256::digest(material.as_bytes())[..]);
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let materials = vec![
            String::new(),
            "short".to_string(),
            "a".repeat(64),
            "x".repeat(32),
            "long".repeat(50),
        ];

        for material in &materials {
            assert_eq!(
                CipherKey::from_material(material),
                CipherKey::from_material(material)
            );
        }
    }

    #[test]
    fn test_derived_key_hex_roundtrip() {
        let derived = DerivedKey::from_bytes([0x5Au8; KEY_LENGTH]);
        let hex = derived.to_hex();

        assert_eq!(hex.len(), HEX_KEY_LENGTH);
        assert_eq!(hex, "5a".repeat(32));
        assert_eq!(CipherKey::from_material(&hex), derived.to_cipher_key());
    }

    #[test]
    fn test_debug_is_redacted() {
        let derived = DerivedKey::from_bytes([7u8; KEY_LENGTH]);
        let cipher = CipherKey::from_bytes([7u8; KEY_LENGTH]);

        assert_eq!(format!("{:?}", derived), "DerivedKey([REDACTED])");
        assert_eq!(format!("{:?}", cipher), "CipherKey([REDACTED])");
    }
}
