//! Merchant terminal loading, validation and periodic reload.
//!
//! # Terminals file
//!
//! ```yaml
//! terminals:
//!   - id: T-0001
//!     mid: "108"
//!     iv_key: hlnuyA9b4YxDq6oJSZFl8g==
//!     iv: hlnuyA9b4YxDq6oJSZFl8g==
//! ```
//!
//! Files ending in `.json` are parsed as JSON with the same shape.
//!
//! # Module invariants
//!
//! - Secret values are never logged; only terminal ids and counts are.
//! - A file that fails to parse or validate never replaces a loaded registry.

pub mod registry;

pub use registry::{Terminal, TerminalRegistry};

use std::collections::HashSet;

use anyhow::{Context, Result};
use envelope::SharedSecret;
use serde::Deserialize;
use tokio::time;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, Deserialize)]
struct TerminalsFile {
    terminals: Vec<TerminalEntry>,
}

#[derive(Deserialize)]
struct TerminalEntry {
    id: String,
    mid: String,
    iv_key: String,
    iv: String,
}

impl std::fmt::Debug for TerminalEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalEntry")
            .field("id", &self.id)
            .field("mid", &self.mid)
            .finish_non_exhaustive()
    }
}

/// Read the terminals file at `cfg.terminals_file` and atomically replace the
/// registry contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or if any entry is
/// invalid. The registry is left untouched in that case.
pub async fn load_from_file(cfg: &Config, registry: &TerminalRegistry) -> Result<()> {
    let path = &cfg.terminals_file;
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read terminals file {path}"))?;

    let terminals = parse_terminals(&text, path.ends_with(".json"))
        .with_context(|| format!("invalid terminals file {path}"))?;
    if terminals.is_empty() {
        warn!(path = %path, "terminals file lists no terminals");
    }

    registry.replace_all(terminals);
    info!(count = registry.len(), "terminal registry loaded");
    Ok(())
}

/// Spawn a background task that periodically re-reads the terminals file.
///
/// On reload failure the previous registry contents are retained and a warning
/// is emitted.
pub fn refresh_task(cfg: Config, registry: TerminalRegistry) -> tokio::task::JoinHandle<()> {
    let interval = std::time::Duration::from_secs(cfg.terminals_refresh_interval_secs);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately — skip it so we don't double-load at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = load_from_file(&cfg, &registry).await {
                warn!(error = %e, "terminal reload failed; retaining previous registry");
            }
        }
    })
}

/// Parse and validate terminal entries.
fn parse_terminals(text: &str, json: bool) -> Result<Vec<Terminal>> {
    let file: TerminalsFile = if json {
        serde_json::from_str(text).context("not valid JSON")?
    } else {
        serde_yaml::from_str(text).context("not valid YAML")?
    };

    let mut seen = HashSet::new();
    let mut terminals = Vec::with_capacity(file.terminals.len());
    for entry in file.terminals {
        if entry.id.trim().is_empty() {
            anyhow::bail!("terminal id must not be empty");
        }
        if entry.mid.trim().is_empty() {
            anyhow::bail!("terminal {}: mid must not be empty", entry.id);
        }
        if !seen.insert(entry.id.clone()) {
            anyhow::bail!("duplicate terminal id {}", entry.id);
        }
        let secret = SharedSecret::new(entry.iv_key, entry.iv)
            .with_context(|| format!("terminal {}", entry.id))?;
        terminals.push(Terminal::new(entry.id, entry.mid, secret));
    }
    Ok(terminals)
}
