//! Defines the HTTP routes mounted under `/vouchers`.

use axum::{routing::delete, Router};

use super::handlers::delete_voucher;
use crate::api::AppState;

pub fn voucher_router() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_voucher))
}
