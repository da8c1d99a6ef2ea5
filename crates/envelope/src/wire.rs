//! Fixed-offset framing of an envelope and its base64 transport form.
//!
//! ```text
//! offset 0             16 bytes   salt
//! offset 16            12 bytes   nonce
//! offset 28            variable   ciphertext
//! offset len - 16      16 bytes   authentication tag
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::CipherError;

/// Byte length of the PBKDF2 salt.
pub const SALT_LEN: usize = 16;

/// Byte length of the AES-GCM nonce (96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the AES-GCM authentication tag (128 bits).
pub const TAG_LEN: usize = 16;

/// Smallest decoded envelope: all fixed fields and an empty ciphertext.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// A decoded envelope split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Per-message PBKDF2 salt.
    pub salt: [u8; SALT_LEN],
    /// Per-message AES-GCM nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext without the tag.
    pub ciphertext: Vec<u8>,
    /// Trailing authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Split AEAD output (`ciphertext || tag`) into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::EncryptionFailure`] if `sealed` is shorter than a tag.
    pub fn from_sealed(
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
        mut sealed: Vec<u8>,
    ) -> Result<Self, CipherError> {
        let tag_start = sealed
            .len()
            .checked_sub(TAG_LEN)
            .ok_or(CipherError::EncryptionFailure)?;
        let tag = sealed
            .split_off(tag_start)
            .try_into()
            .map_err(|_| CipherError::EncryptionFailure)?;
        Ok(Self {
            salt,
            nonce,
            ciphertext: sealed,
            tag,
        })
    }

    /// `ciphertext || tag`, the layout AES-GCM decryption expects.
    pub fn sealed_ciphertext(&self) -> Vec<u8> {
        let mut sealed = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&self.ciphertext);
        sealed.extend_from_slice(&self.tag);
        sealed
    }

    /// Pack as `salt || nonce || ciphertext || tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&self.tag);
        buf
    }

    /// Slice a raw buffer at the fixed offsets.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedEnvelope`] if `buf` is shorter than
    /// [`MIN_ENVELOPE_LEN`].
    pub fn from_bytes(buf: &[u8]) -> Result<Self, CipherError> {
        if buf.len() < MIN_ENVELOPE_LEN {
            return Err(CipherError::MalformedEnvelope);
        }
        let (salt, rest) = buf.split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

        Ok(Self {
            salt: salt.try_into().map_err(|_| CipherError::MalformedEnvelope)?,
            nonce: nonce.try_into().map_err(|_| CipherError::MalformedEnvelope)?,
            ciphertext: ciphertext.to_vec(),
            tag: tag.try_into().map_err(|_| CipherError::MalformedEnvelope)?,
        })
    }

    /// Standard (padded) base64 of [`Envelope::to_bytes`].
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the base64 transport form.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedEnvelope`] if `s` is not valid base64 or
    /// decodes to fewer than [`MIN_ENVELOPE_LEN`] bytes.
    pub fn decode(s: &str) -> Result<Self, CipherError> {
        let buf = STANDARD
            .decode(s)
            .map_err(|_| CipherError::MalformedEnvelope)?;
        Self::from_bytes(&buf)
    }
}
