//! Common types used throughout usercrypt.

use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Server-held secret used as the password input to key derivation.
///
/// Constant across all users and never transmitted. The inner string is
/// zeroized when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ServerSecret(String);

impl ServerSecret {
    /// Create a new ServerSecret from a string.
    ///
    /// # Errors
    /// - Returns error if the secret is empty
    pub fn new(secret: impl Into<String>) -> crate::Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(crate::Error::InvalidInput(
                "server secret must not be empty".to_string(),
            ));
        }
        Ok(Self(secret))
    }

    /// Get the secret string.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServerSecret([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for ServerSecret {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secret = String::deserialize(deserializer)?;
        Self::new(secret).map_err(serde::de::Error::custom)
    }
}
