//! usercrypt CLI - Command line interface for per-user encryption.
//!
//! Derives user keys from the server secret and encrypts or decrypts text
//! envelopes with them.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use usercrypt_common::{EncryptionConfig, SERVER_SECRET_VAR};
use usercrypt_crypto::{decrypt_text, derive_key_with_config, encrypt_text};

#[derive(Parser)]
#[command(name = "usercrypt")]
#[command(about = "usercrypt - Per-user authenticated encryption")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file. Defaults to the ENCRYPTION_SECRET variable.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive and print the hex key for a user.
    Derive {
        /// Stable user identifier (e.g. an identity-provider subject).
        #[arg(short, long)]
        user: String,
    },

    /// Encrypt text into a base64 envelope.
    Encrypt {
        #[command(flatten)]
        key: KeySource,

        /// Text to encrypt. Read from stdin if omitted.
        text: Option<String>,
    },

    /// Decrypt a base64 envelope.
    Decrypt {
        #[command(flatten)]
        key: KeySource,

        /// Envelope to decrypt. Read from stdin if omitted.
        envelope: Option<String>,
    },

    /// Check that the server secret is configured.
    CheckConfig,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct KeySource {
    /// Key material: 64 hex chars, a 32-byte string, or any passphrase.
    #[arg(short, long)]
    key: Option<String>,

    /// Derive the key for this user from the server secret.
    #[arg(short, long)]
    user: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Derive { user } => cmd_derive(&config, &user),
        Commands::Encrypt { key, text } => cmd_encrypt(&config, &key, text),
        Commands::Decrypt { key, envelope } => cmd_decrypt(&config, &key, envelope),
        Commands::CheckConfig => cmd_check_config(&config),
    }
}

/// Load configuration from a file if given, else from the environment.
fn load_config(path: Option<&Path>) -> Result<EncryptionConfig> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            EncryptionConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Ok(EncryptionConfig::from_env()),
    }
}

/// Resolve key material from `--key` or by deriving it for `--user`.
fn resolve_key(config: &EncryptionConfig, source: &KeySource) -> Result<Zeroizing<String>> {
    match (&source.key, &source.user) {
        (Some(key), _) => Ok(Zeroizing::new(key.clone())),
        (None, Some(user)) => {
            let key = derive_key_with_config(user, config).context("Failed to derive user key")?;
            Ok(Zeroizing::new(key.to_hex()))
        }
        (None, None) => anyhow::bail!("Either --key or --user is required"),
    }
}

/// Use the positional argument, or read all of stdin.
fn input_or_stdin(input: Option<String>) -> Result<String> {
    match input {
        Some(input) => Ok(input),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

/// Print the derived key for a user.
fn cmd_derive(config: &EncryptionConfig, user: &str) -> Result<()> {
    info!("Deriving key for user");

    let key = derive_key_with_config(user, config).context("Failed to derive user key")?;
    println!("{}", key.to_hex());

    Ok(())
}

/// Encrypt text and print the envelope.
fn cmd_encrypt(config: &EncryptionConfig, source: &KeySource, text: Option<String>) -> Result<()> {
    let key = resolve_key(config, source)?;
    let text = Zeroizing::new(input_or_stdin(text)?);

    let envelope = encrypt_text(&text, &key).context("Failed to encrypt")?;
    debug!("Encrypted {} bytes", text.len());
    println!("{}", envelope);

    Ok(())
}

/// Decrypt an envelope and print the plaintext.
fn cmd_decrypt(
    config: &EncryptionConfig,
    source: &KeySource,
    envelope: Option<String>,
) -> Result<()> {
    let key = resolve_key(config, source)?;
    let envelope = input_or_stdin(envelope)?;

    let plaintext = Zeroizing::new(decrypt_text(envelope.trim(), &key).context("Failed to decrypt")?);
    println!("{}", plaintext.as_str());

    Ok(())
}

/// Fail fast if the server secret is missing.
fn cmd_check_config(config: &EncryptionConfig) -> Result<()> {
    config
        .validate()
        .with_context(|| format!("Set {} or pass --config", SERVER_SECRET_VAR))?;
    println!("Configuration OK");

    Ok(())
}
