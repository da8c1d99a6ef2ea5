//! AES-256-GCM envelope encryption with a per-message PBKDF2 key.
//!
//! Each call draws a fresh salt and nonce from the OS CSPRNG and derives its
//! own key, so encrypting the same plaintext twice never yields the same
//! envelope and concurrent calls share nothing.
//!
//! **Do NOT cache derived keys across calls.** The salt is per message; a
//! cached key would only be valid for the envelope it came from.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha512;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::CipherError;
use crate::passphrase::{Passphrase, SharedSecret};
use crate::wire::{Envelope, NONCE_LEN, SALT_LEN};

/// Byte length of the derived AES-256 key.
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA512 iteration count fixed by the gateway.
pub const PBKDF2_ITERATIONS: u32 = 65_535;

/// Encryptor/decryptor bound to one terminal's passphrase.
///
/// Immutable once built. Construct one per payment attempt and pass it by
/// value; nothing inside is shared with other attempts.
#[derive(Debug, Clone)]
pub struct EnvelopeCipher {
    passphrase: Passphrase,
}

impl EnvelopeCipher {
    /// Derive the passphrase from `secret` and bind it to a new cipher.
    pub fn new(secret: &SharedSecret) -> Self {
        Self::from_passphrase(secret.passphrase())
    }

    /// Bind an already-derived passphrase.
    pub fn from_passphrase(passphrase: Passphrase) -> Self {
        Self { passphrase }
    }

    /// Encrypt `plaintext` into a base64 envelope. See [`encrypt`].
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        encrypt(&self.passphrase, plaintext)
    }

    /// Decrypt a base64 envelope. See [`decrypt`].
    pub fn decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        decrypt(&self.passphrase, envelope)
    }

    /// Serialise `value` as JSON and encrypt the text.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Encoding`] if `value` cannot be serialised, or
    /// any error from [`encrypt`].
    pub fn encrypt_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CipherError> {
        let text =
            serde_json::to_string(value).map_err(|e| CipherError::Encoding(e.to_string()))?;
        self.encrypt(&text)
    }

    /// Decrypt an envelope and parse the plaintext as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Encoding`] if the plaintext is not the expected
    /// JSON, or any error from [`decrypt`].
    pub fn decrypt_json<T: DeserializeOwned>(&self, envelope: &str) -> Result<T, CipherError> {
        let text = self.decrypt(envelope)?;
        serde_json::from_str(&text).map_err(|e| CipherError::Encoding(e.to_string()))
    }
}

/// Encrypt `plaintext` under `passphrase`.
///
/// Generates a random 16-byte salt and 12-byte nonce, derives the key with
/// PBKDF2-HMAC-SHA512, seals with AES-256-GCM (no associated data) and returns
/// `base64(salt || nonce || ciphertext || tag)`.
///
/// # Errors
///
/// Returns [`CipherError::Configuration`] if key derivation fails and
/// [`CipherError::EncryptionFailure`] if AES-GCM rejects the input.
pub fn encrypt(passphrase: &Passphrase, plaintext: &str) -> Result<String, CipherError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt)?;
    let sealed = build_cipher(&key)
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| CipherError::EncryptionFailure)?;

    let envelope = Envelope::from_sealed(salt, nonce, sealed)?;
    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = envelope.ciphertext.len(),
        "envelope sealed"
    );
    Ok(envelope.encode())
}

/// Decrypt a base64 envelope under `passphrase`.
///
/// The key is re-derived from the salt carried in the envelope itself.
///
/// # Errors
///
/// - [`CipherError::MalformedEnvelope`] if the input is not base64 or is shorter
///   than the fixed fields. No key derivation is attempted.
/// - [`CipherError::AuthenticationFailure`] if the tag does not verify.
/// - [`CipherError::Encoding`] if the plaintext is not UTF-8.
pub fn decrypt(passphrase: &Passphrase, envelope: &str) -> Result<String, CipherError> {
    let envelope = Envelope::decode(envelope)?;

    let key = derive_key(passphrase, &envelope.salt)?;
    let plaintext = build_cipher(&key)
        .decrypt(
            Nonce::from_slice(&envelope.nonce),
            envelope.sealed_ciphertext().as_slice(),
        )
        .map_err(|_| CipherError::AuthenticationFailure)?;

    debug!(ciphertext_len = envelope.ciphertext.len(), "envelope opened");
    String::from_utf8(plaintext).map_err(|e| CipherError::Encoding(e.to_string()))
}

fn derive_key(
    passphrase: &Passphrase,
    salt: &[u8; SALT_LEN],
) -> Result<Zeroizing<[u8; KEY_LEN]>, CipherError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::<Hmac<Sha512>>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..])
        .map_err(|_| CipherError::Configuration("PBKDF2 rejected the passphrase".into()))?;
    Ok(key)
}

fn build_cipher(key: &[u8; KEY_LEN]) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key))
}
