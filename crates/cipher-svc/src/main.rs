//! `cipher-svc` — payment envelope sidecar entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise logging (and OTLP export when configured).
//! 3. Load merchant terminals into the [`TerminalRegistry`].
//! 4. Spawn the background terminal reload task.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod server;
mod telemetry;
mod terminals;

use anyhow::Result;
use tracing::info;

use config::Config;
use server::state::AppState;
use terminals::TerminalRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "cipher-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. Terminal registry
    // -----------------------------------------------------------------------
    let registry = TerminalRegistry::new();
    terminals::load_from_file(&cfg, &registry).await?;

    // -----------------------------------------------------------------------
    // 4. Background tasks
    // -----------------------------------------------------------------------
    let _terminal_reload = terminals::refresh_task(cfg.clone(), registry.clone());

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(registry));

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
