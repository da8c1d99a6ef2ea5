//! Master passphrase derivation from a terminal's shared secret pair.
//!
//! The passphrase is `base64(SHA-256(iv_key || iv))`. The base64 *text* (not
//! the raw digest) is what later feeds PBKDF2 as password material; the
//! gateway does the same and the two sides must agree byte for byte.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::CipherError;

/// The `(iv_key, iv)` pair provisioned out of band for one merchant terminal.
///
/// Both values are zeroized on drop and never printed.
#[derive(Clone)]
pub struct SharedSecret {
    iv_key: Zeroizing<String>,
    iv: Zeroizing<String>,
}

impl SharedSecret {
    /// Build a secret pair, rejecting empty or whitespace-only values.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Configuration`] if either value is blank.
    pub fn new(iv_key: impl Into<String>, iv: impl Into<String>) -> Result<Self, CipherError> {
        let iv_key = Zeroizing::new(iv_key.into());
        let iv = Zeroizing::new(iv.into());
        ensure_present(&iv_key, "iv_key")?;
        ensure_present(&iv, "iv")?;
        Ok(Self { iv_key, iv })
    }

    /// Derive the base passphrase for this pair.
    pub fn passphrase(&self) -> Passphrase {
        digest_passphrase(&self.iv_key, &self.iv)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// Base64 text of `SHA-256(iv_key || iv)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    /// UTF-8 bytes of the base64 text, used as the PBKDF2 password.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

/// Derive the passphrase for `(iv_key, iv)`.
///
/// Deterministic and order-sensitive: `iv_key` is hashed first.
///
/// # Errors
///
/// Returns [`CipherError::Configuration`] if either input is blank.
pub fn derive_base_passphrase(iv_key: &str, iv: &str) -> Result<Passphrase, CipherError> {
    ensure_present(iv_key, "iv_key")?;
    ensure_present(iv, "iv")?;
    Ok(digest_passphrase(iv_key, iv))
}

fn digest_passphrase(iv_key: &str, iv: &str) -> Passphrase {
    let mut hasher = Sha256::new();
    hasher.update(iv_key.as_bytes());
    hasher.update(iv.as_bytes());
    let digest = hasher.finalize();
    Passphrase(Zeroizing::new(STANDARD.encode(digest)))
}

fn ensure_present(value: &str, name: &str) -> Result<(), CipherError> {
    if value.trim().is_empty() {
        return Err(CipherError::Configuration(format!(
            "{name} is required and must not be empty"
        )));
    }
    Ok(())
}
