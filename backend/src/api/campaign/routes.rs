//! Defines the HTTP routes mounted under `/campaigns`.

use axum::{routing::get, Router};

use super::handlers::{
    create_campaign, create_vouchers, delete_campaign, download_vouchers_csv, get_campaign,
    list_campaigns, list_vouchers, stream_vouchers,
};
use crate::api::AppState;

pub fn campaign_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_campaigns).post(create_campaign))
        .route("/:id", get(get_campaign).delete(delete_campaign))
        .route("/:id/vouchers", get(list_vouchers).post(create_vouchers))
        .route("/:id/vouchers/stream", get(stream_vouchers))
        .route("/:id/vouchers/csv", get(download_vouchers_csv))
}
