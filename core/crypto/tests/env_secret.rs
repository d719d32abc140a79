//! Environment-backed derivation with the secret present.
//!
//! Lives in its own test binary because the process-wide configuration is
//! loaded only once.

use usercrypt_common::SERVER_SECRET_VAR;
use usercrypt_crypto::{decrypt_text, derive_key_from_env, derive_key_hex, encrypt_text};

#[test]
fn test_derive_from_env_uses_configured_secret() {
    std::env::set_var(SERVER_SECRET_VAR, "test-secret");

    let from_env = derive_key_from_env("user-123").unwrap();
    let direct = derive_key_hex("user-123", "test-secret").unwrap();
    assert_eq!(from_env, direct);

    // Changing the variable afterwards has no effect.
    std::env::set_var(SERVER_SECRET_VAR, "other-secret");
    assert_eq!(derive_key_from_env("user-123").unwrap(), direct);

    let encrypted = encrypt_text("note for user-123", &from_env).unwrap();
    assert_eq!(decrypt_text(&encrypted, &direct).unwrap(), "note for user-123");
}
