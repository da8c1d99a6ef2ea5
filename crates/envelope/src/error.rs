//! Errors produced by the envelope cipher.

use thiserror::Error;

use crate::wire::MIN_ENVELOPE_LEN;

/// Errors produced by the cipher layer.
///
/// Every failure is surfaced to the immediate caller; the cipher never falls
/// back to a default key or returns a placeholder value.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The shared secrets are missing or empty, or key derivation rejected them.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The envelope is not valid base64 or is too short to hold its fixed fields.
    #[error("malformed envelope: expected base64 of at least {MIN_ENVELOPE_LEN} bytes")]
    MalformedEnvelope,

    /// AEAD tag verification failed.
    ///
    /// Wrong passphrase, tampering and transit corruption are reported identically.
    #[error("envelope authentication failed")]
    AuthenticationFailure,

    /// Decryption succeeded but the plaintext is not valid UTF-8 / expected JSON,
    /// or a value could not be serialised before encryption.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// AES-GCM refused to encrypt the input.
    #[error("aead encryption failed")]
    EncryptionFailure,
}

impl CipherError {
    /// Short machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::Configuration(_) => "configuration_error",
            CipherError::MalformedEnvelope => "malformed_envelope",
            CipherError::AuthenticationFailure => "authentication_failure",
            CipherError::Encoding(_) => "encoding_error",
            CipherError::EncryptionFailure => "encryption_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            CipherError::Configuration("x".into()).code(),
            CipherError::MalformedEnvelope.code(),
            CipherError::AuthenticationFailure.code(),
            CipherError::Encoding("x".into()).code(),
            CipherError::EncryptionFailure.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn authentication_failure_does_not_name_a_cause() {
        let msg = CipherError::AuthenticationFailure.to_string();
        assert!(!msg.contains("key"));
        assert!(!msg.contains("tamper"));
    }

    #[test]
    fn malformed_message_mentions_minimum_length() {
        assert!(CipherError::MalformedEnvelope.to_string().contains("44"));
    }
}
