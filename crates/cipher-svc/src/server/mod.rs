//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Map cipher failures onto HTTP status codes without revealing their cause
//!   beyond the typed error code.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
