//! Structured logging, with optional OTLP span export.
//!
//! # Telemetry invariants
//!
//! - **No secrets, passphrases, keys, plaintext or envelopes** may appear in any
//!   span attribute or log field. Terminal ids and byte lengths may.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
