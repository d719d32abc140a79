//! Common utilities and types shared across usercrypt crates.
//!
//! This module provides the error type, the server secret wrapper and the
//! configuration handle consumed by key derivation.

pub mod config;
pub mod error;
pub mod types;

pub use config::{EncryptionConfig, SERVER_SECRET_VAR};
pub use error::{Error, Result};
pub use types::ServerSecret;
