//! Credential resolution from the process environment.
//!
//! Three credentials, each required only by the operation that uses it:
//! the AoC session cookie for downloads, the age recipient (public key)
//! for encryption, and the age identity (private key) for decryption.
//! A missing variable is a configuration error, reported before any
//! network or crypto work starts; it is never a crypto failure.

use thiserror::Error;

/// Session cookie for adventofcode.com.
pub const SESSION_VAR: &str = "AOC_SESSION";
/// age x25519 public key the archive is encrypted to.
pub const PUBKEY_VAR: &str = "AOC_INPUTS_PUBKEY";
/// age x25519 identity that can decrypt the archive.
pub const SECRET_VAR: &str = "AOC_INPUTS_SECRET";

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("need {var} to be set to {purpose}")]
    MissingEnv {
        var: &'static str,
        purpose: &'static str,
    },

    #[error("{var} is not a valid age key: {reason}")]
    InvalidKey { var: &'static str, reason: String },
}

/// Lazy accessors over the environment; nothing is read at construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct Credentials;

impl Credentials {
    pub fn new() -> Self {
        Self
    }

    /// Session cookie for the fetch client.
    pub fn session(&self) -> Result<String, ConfigError> {
        require(SESSION_VAR, "download puzzle inputs")
    }

    /// Recipient key for `pack_and_encrypt`.
    pub fn recipient(&self) -> Result<age::x25519::Recipient, ConfigError> {
        let raw = require(PUBKEY_VAR, "encrypt puzzle inputs")?;
        raw.trim().parse().map_err(|e| ConfigError::InvalidKey {
            var: PUBKEY_VAR,
            reason: format!("{e}"),
        })
    }

    /// Identity for `decrypt_and_unpack`.
    pub fn identity(&self) -> Result<age::x25519::Identity, ConfigError> {
        let raw = require(SECRET_VAR, "decrypt puzzle inputs")?;
        raw.trim().parse().map_err(|e| ConfigError::InvalidKey {
            var: SECRET_VAR,
            reason: format!("{e}"),
        })
    }
}

fn require(var: &'static str, purpose: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv { var, purpose }),
    }
}
