//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the API domains (campaigns
//! and individual vouchers) and assembles them into the application router.

pub mod campaign;
pub mod voucher;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use store::VoucherStore;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::middleware;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VoucherStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn VoucherStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = middleware::cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/campaigns", campaign::routes::campaign_router())
        .nest("/vouchers", voucher::routes::voucher_router())
        .layer(cors)
        .layer(middleware::trace_layer())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Voucher API running"
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid id"))
}
