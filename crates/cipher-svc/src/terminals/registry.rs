//! In-memory registry of merchant terminals, keyed by terminal id.
//!
//! The registry uses `arc-swap` for lock-free reads on the request path. It
//! holds only the long-lived secret pairs; ciphers are built per request.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use envelope::{EnvelopeCipher, SharedSecret};
use thiserror::Error;

/// Errors from the terminal registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested terminal id has no entry in the registry.
    #[error("unknown terminal: {0}")]
    UnknownTerminal(String),
}

/// One merchant terminal and its shared secret pair.
#[derive(Debug, Clone)]
pub struct Terminal {
    /// Terminal id sent to the gateway as `terminalId`.
    pub id: String,
    /// Merchant id sent to the gateway as `mid`.
    pub mid: String,
    secret: SharedSecret,
}

impl Terminal {
    /// Create a terminal entry.
    pub fn new(id: impl Into<String>, mid: impl Into<String>, secret: SharedSecret) -> Self {
        Self {
            id: id.into(),
            mid: mid.into(),
            secret,
        }
    }

    /// Build a fresh cipher for one payment attempt.
    pub fn cipher(&self) -> EnvelopeCipher {
        EnvelopeCipher::new(&self.secret)
    }
}

/// Shared, lock-free registry of terminals keyed by id.
///
/// Internally backed by [`ArcSwap`] so readers never block and the background
/// refresh task can atomically swap in a completely new map.
#[derive(Clone, Debug)]
pub struct TerminalRegistry {
    inner: Arc<ArcSwap<HashMap<String, Arc<Terminal>>>>,
}

impl TerminalRegistry {
    /// Create a new, empty [`TerminalRegistry`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(HashMap::new()))),
        }
    }

    /// Return the number of terminals currently registered.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Return `true` if no terminals are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Look up a terminal by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownTerminal`] if `id` is not present.
    pub fn get(&self, id: &str) -> Result<Arc<Terminal>, RegistryError> {
        self.inner
            .load()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTerminal(id.to_owned()))
    }

    /// Atomically replace the entire terminal map.
    pub fn replace_all(&self, terminals: Vec<Terminal>) {
        let new_map: HashMap<String, Arc<Terminal>> = terminals
            .into_iter()
            .map(|t| (t.id.clone(), Arc::new(t)))
            .collect();
        self.inner.store(Arc::new(new_map));
    }
}

impl Default for TerminalRegistry {
    fn default() -> Self {
        Self::new()
    }
}
