//! Triad Gateway - the single HTTP ingress for the stack, linked-list and graph services.
//!
//! The gateway exposes one flat JSON API and forwards each call to the owning
//! upstream service. It implements a **hexagonal architecture**: the transport
//! to the upstreams is a port ([`HttpClient`]), the axum server and the hyper
//! client are adapters, and routing, validation, retry and response shaping
//! live in `core`.
//!
//! # Features
//! - Static route table (13 routes) with exact path + method matching
//! - Per-route body rules: forward JSON as-is, or require an integer `value`
//! - Retry with exponential backoff on transport failures and timeouts only
//! - Upstream statuses passed through unchanged; local 400 / 404 / 503 / 504
//! - Every response body is JSON (non-JSON upstream text is wrapped)
//! - Environment-driven configuration with an optional config file
//! - Structured tracing via `tracing` (JSON or pretty)
//! - Graceful shutdown on SIGINT / SIGTERM
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use triad_gateway::{GatewayService, HttpClientAdapter, HttpHandler, config};
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let cfg = config::load_config(None)?;
//! let client = Arc::new(HttpClientAdapter::new()?);
//! let gateway = Arc::new(GatewayService::new(&cfg, client));
//! let app = HttpHandler::new(gateway).router(cfg.cors_enabled);
//! let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(()) }
//! ```
//!
//! # Error Handling
//! Startup paths return `eyre::Result<T>` with context attached. Request
//! handling never fails: every failure becomes a JSON response with a
//! status code.
pub mod config;
pub mod ports;
pub mod tracing_setup;
pub mod utils;

pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{HttpClientAdapter, HttpHandler},
    core::{GatewayService, NormalizedResponse},
    ports::http_client::HttpClient,
    utils::GracefulShutdown,
};
