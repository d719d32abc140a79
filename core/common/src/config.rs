//! Encryption configuration.
//!
//! The server secret is read once, either from the process environment or
//! from a JSON file, and handed to key derivation as an explicit value.

use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::types::ServerSecret;

/// Name of the environment variable holding the server secret.
pub const SERVER_SECRET_VAR: &str = "ENCRYPTION_SECRET";

static GLOBAL: OnceLock<EncryptionConfig> = OnceLock::new();

/// Configuration consumed by key derivation.
///
/// An absent secret is not an error at load time; it is reported by
/// [`EncryptionConfig::server_secret`] on every call that needs it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncryptionConfig {
    #[serde(default)]
    server_secret: Option<ServerSecret>,
}

impl EncryptionConfig {
    /// Create a configuration holding the given secret.
    pub fn with_server_secret(secret: ServerSecret) -> Self {
        Self {
            server_secret: Some(secret),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// An empty value is treated the same as an absent one.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_secret = lookup(SERVER_SECRET_VAR).and_then(|s| ServerSecret::new(s).ok());
        Self { server_secret }
    }

    /// Load configuration from a JSON file of the form
    /// `{ "server_secret": "..." }`.
    ///
    /// # Errors
    /// - Returns error if the file cannot be read
    /// - Returns error if the contents are not valid configuration JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Serialization(format!("Invalid configuration file: {}", e)))
    }

    /// Process-wide configuration, loaded from the environment on first
    /// access and immutable afterwards.
    pub fn global() -> &'static EncryptionConfig {
        GLOBAL.get_or_init(Self::from_env)
    }

    /// Get the server secret.
    ///
    /// # Errors
    /// - Returns `MissingConfiguration` naming [`SERVER_SECRET_VAR`] if unset
    pub fn server_secret(&self) -> Result<&ServerSecret> {
        self.server_secret
            .as_ref()
            .ok_or_else(|| Error::MissingConfiguration(SERVER_SECRET_VAR.to_string()))
    }

    /// Check that every required setting is present.
    ///
    /// Intended for startup so a deployment fails fast instead of on the
    /// first request.
    pub fn validate(&self) -> Result<()> {
        self.server_secret().map(|_| ())
    }
}
