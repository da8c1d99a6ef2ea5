//! Shared application state injected into every Axum handler.

use crate::terminals::TerminalRegistry;

/// Application state shared across all request handlers.
///
/// The registry is `Arc`-backed so Axum can clone the state per request
/// without copying terminal data.
#[derive(Clone, Default)]
pub struct AppState {
    /// Lock-free registry of configured merchant terminals.
    pub registry: TerminalRegistry,
}

impl AppState {
    /// Create a new [`AppState`] around the provided registry.
    pub fn new(registry: TerminalRegistry) -> Self {
        Self { registry }
    }
}
