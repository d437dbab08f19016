//! Voucher campaign service.
//!
//! An axum HTTP API for creating marketing campaigns and bulk-generating,
//! listing, exporting and deleting their voucher codes. Persistence goes
//! through the `store` crate.

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter; `log` records from the store crate are forwarded too.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
