//! Handler functions for single-voucher endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::api::{parse_id, AppState};
use crate::errors::{ApiError, Context};

pub async fn delete_voucher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .store
        .delete_voucher(id)
        .await
        .context("Failed to delete voucher")?;
    if !deleted {
        return Err(ApiError::not_found("Voucher not found"));
    }
    Ok(Json(json!({ "message": "Voucher deleted" })))
}
