//! Payment envelope cipher.
//!
//! Turns a plaintext JSON payload into a single self-contained, tamper-evident
//! base64 string (and back) using the `(iv_key, iv)` secret pair provisioned
//! for a merchant terminal.
//!
//! This crate is intentionally free of HTTP and runtime dependencies. Callers
//! build one [`EnvelopeCipher`] per payment attempt and drop it afterwards.
//!
//! # Envelope format
//!
//! ```text
//! base64( salt[16] || nonce[12] || ciphertext[..] || tag[16] )
//! ```
//!
//! The key for each envelope is `PBKDF2-HMAC-SHA512(passphrase, salt, 65535)`
//! where `passphrase = base64(SHA-256(iv_key || iv))`.

pub mod cipher;
pub mod error;
pub mod passphrase;
pub mod wire;

pub use cipher::{decrypt, encrypt, EnvelopeCipher, KEY_LEN, PBKDF2_ITERATIONS};
pub use error::CipherError;
pub use passphrase::{derive_base_passphrase, Passphrase, SharedSecret};
pub use wire::{Envelope, MIN_ENVELOPE_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
