//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! The server secret is the password and the user identifier is the salt,
//! so every user gets a distinct key without any key ever being stored.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::debug;

use crate::keys::{DerivedKey, KEY_LENGTH};
use usercrypt_common::{EncryptionConfig, Error, Result};

/// Iteration count used for all production derivations.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Parameters for PBKDF2 key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Number of HMAC iterations.
    pub iterations: u32,
}

impl KdfParams {
    /// Create parameters with a custom iteration count.
    ///
    /// # Errors
    /// - Returns error if `iterations` is zero
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations == 0 {
            return Err(Error::InvalidInput(
                "PBKDF2 iteration count must be at least 1".to_string(),
            ));
        }
        Ok(Self { iterations })
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

/// Derive a user key from a user identifier and the server secret.
///
/// # Preconditions
/// - `user_id` must not be empty
/// - `server_secret` must not be empty
///
/// # Postconditions
/// - The derived key is deterministic given the same inputs
///
/// # Errors
/// - Returns `InvalidInput` naming the empty argument
pub fn derive_key(user_id: &str, server_secret: &str) -> Result<DerivedKey> {
    derive_key_with_params(user_id, server_secret, &KdfParams::default())
}

/// Derive a user key and render it as 64 lowercase hex characters.
pub fn derive_key_hex(user_id: &str, server_secret: &str) -> Result<String> {
    derive_key(user_id, server_secret).map(|key| key.to_hex())
}

/// Derive a user key with explicit parameters.
pub fn derive_key_with_params(
    user_id: &str,
    server_secret: &str,
    params: &KdfParams,
) -> Result<DerivedKey> {
    if user_id.is_empty() {
        return Err(Error::InvalidInput(
            "user identifier must not be empty".to_string(),
        ));
    }
    if server_secret.is_empty() {
        return Err(Error::InvalidInput(
            "server secret must not be empty".to_string(),
        ));
    }
    if params.iterations == 0 {
        return Err(Error::InvalidInput(
            "PBKDF2 iteration count must be at least 1".to_string(),
        ));
    }

    debug!(iterations = params.iterations, "deriving user key");

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(
        server_secret.as_bytes(),
        user_id.as_bytes(),
        params.iterations,
        &mut key_bytes,
    );

    Ok(DerivedKey::from_bytes(key_bytes))
}

/// Derive a user key using the secret held by `config`.
///
/// # Errors
/// - Returns `MissingConfiguration` if the config has no server secret
/// - Returns `InvalidInput` if `user_id` is empty
pub fn derive_key_with_config(user_id: &str, config: &EncryptionConfig) -> Result<DerivedKey> {
    let secret = config.server_secret()?;
    derive_key(user_id, secret.expose())
}

/// Derive a user key as hex using the process-wide configuration.
///
/// The configuration is read from the environment once, on first use.
pub fn derive_key_from_env(user_id: &str) -> Result<String> {
    derive_key_with_config(user_id, EncryptionConfig::global()).map(|key| key.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use usercrypt_common::ServerSecret;

    fn fast() -> KdfParams {
        KdfParams::new(1_000).unwrap()
    }

    #[test]
    fn test_known_answer() {
        // RFC 7914 section 11, first 32 bytes of the c = 1 vector.
        let params = KdfParams::new(1).unwrap();
        let key = derive_key_with_params("salt", "passwd", &params).unwrap();

        assert_eq!(
            key.to_hex(),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_derive_key_hex_format() {
        let key = derive_key_hex("google-sub-123", "server-secret").unwrap();

        assert_eq!(key.len(), 64);
        assert!(key
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_derive_key_deterministic() {
        let key1 = derive_key("123456789012345678901", "my-secret").unwrap();
        let key2 = derive_key("123456789012345678901", "my-secret").unwrap();

        assert_eq!(key1, key2);
        assert_eq!(key1.to_hex(), key2.to_hex());
    }

    #[test]
    fn test_derive_key_different_user() {
        let key1 = derive_key_with_params("user-1", "same-secret", &fast()).unwrap();
        let key2 = derive_key_with_params("user-2", "same-secret", &fast()).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_derive_key_different_secret() {
        let key1 = derive_key_with_params("same-user", "secret-1", &fast()).unwrap();
        let key2 = derive_key_with_params("same-user", "secret-2", &fast()).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_iteration_count_matters() {
        let key1 = derive_key_with_params("user", "secret", &KdfParams::new(1).unwrap()).unwrap();
        let key2 = derive_key_with_params("user", "secret", &KdfParams::new(2).unwrap()).unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_no_collisions_across_sample() {
        let keys: std::collections::HashSet<String> = (0..20)
            .map(|i| {
                derive_key_with_params(&format!("user-{}", i), "secret", &fast())
                    .unwrap()
                    .to_hex()
            })
            .collect();

        assert_eq!(keys.len(), 20);
    }

    #[test]
    fn test_empty_user_id_fails() {
        match derive_key("", "secret") {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("user identifier")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_secret_fails() {
        match derive_key("sub", "") {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("server secret")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(KdfParams::new(0).is_err());

        let params = KdfParams { iterations: 0 };
        assert!(matches!(
            derive_key_with_params("user", "secret", &params),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_derive_with_config_matches_direct() {
        let config = EncryptionConfig::with_server_secret(ServerSecret::new("test-secret").unwrap());

        let from_config = derive_key_with_config("user-123", &config).unwrap();
        let direct = derive_key("user-123", "test-secret").unwrap();

        assert_eq!(from_config, direct);
    }

    #[test]
    fn test_derive_with_config_missing_secret() {
        let config = EncryptionConfig::from_lookup(|_| None);

        match derive_key_with_config("user-123", &config) {
            Err(Error::MissingConfiguration(name)) => assert_eq!(name, "ENCRYPTION_SECRET"),
            other => panic!("expected MissingConfiguration, got {:?}", other),
        }
    }
}
