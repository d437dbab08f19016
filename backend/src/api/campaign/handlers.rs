//! Handler functions for the campaign API.
//!
//! These functions parse path, query and body input, call the store or the
//! generation/export services, and shape the responses. Store failures are
//! logged and answered with a 500 carrying a per-endpoint message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use store::{Campaign, PageRequest, StoreResult, VoucherPage};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use crate::api::{parse_id, AppState};
use crate::errors::{ApiError, Context};
use crate::services::campaign_input::CreateCampaignRequest;
use crate::services::csv_export::{attachment_filename, vouchers_to_csv};
use crate::services::voucher_generator::{Progress, VoucherGenerator};

async fn find_campaign(state: &AppState, raw_id: &str, failure: &'static str) -> Result<Campaign, ApiError> {
    let id = parse_id(raw_id)?;
    state
        .store
        .get_campaign(id)
        .await
        .context(failure)?
        .ok_or_else(|| ApiError::not_found("Campaign not found"))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    body: Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let new_campaign = request.validate().map_err(ApiError::BadRequest)?;

    let campaign = state
        .store
        .create_campaign(new_campaign)
        .await
        .context("Failed to create campaign")?;
    tracing::info!(campaign = %campaign.id, prefix = %campaign.prefix, "created campaign");
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn list_campaigns(State(state): State<AppState>) -> Result<Json<Vec<Campaign>>, ApiError> {
    let campaigns = state
        .store
        .list_campaigns()
        .await
        .context("Failed to fetch campaigns")?;
    Ok(Json(campaigns))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = find_campaign(&state, &id, "Failed to fetch campaign").await?;
    Ok(Json(campaign))
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .store
        .delete_campaign(id)
        .await
        .context("Failed to delete campaign")?;
    if !deleted {
        return Err(ApiError::not_found("Campaign not found"));
    }
    tracing::info!(campaign = %id, "deleted campaign");
    Ok(Json(json!({ "message": "Campaign deleted" })))
}

#[derive(Deserialize, Debug)]
pub struct GenerateRequest {
    pub count: Option<i64>,
}

fn validate_count(count: Option<i64>, max: u64) -> Result<u64, ApiError> {
    let count = count
        .filter(|c| *c > 0)
        .map(|c| c as u64)
        .ok_or_else(|| ApiError::bad_request("Invalid count"))?;
    if count > max {
        return Err(ApiError::bad_request(format!("Count cannot exceed {max}")));
    }
    Ok(count)
}

pub async fn create_vouchers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let requested = body.ok().and_then(|Json(req)| req.count);
    let count = validate_count(requested, state.config.max_generation_count)?;
    let campaign = find_campaign(&state, &id, "Failed to create vouchers").await?;

    let created = VoucherGenerator::new(state.store.clone())
        .generate(&campaign, count, state.config.default_batch_size, None)
        .await
        .context("Failed to create vouchers")?;
    Ok((StatusCode::CREATED, Json(json!({ "created": created }))))
}

#[derive(Deserialize, Debug)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_vouchers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<VoucherPage>, ApiError> {
    let invalid = || ApiError::bad_request("Invalid pagination");
    let Query(params) = params.map_err(|_| invalid())?;
    let limit = params
        .limit
        .unwrap_or(state.config.default_page_size)
        .min(state.config.max_page_size);
    let page = PageRequest::new(params.page.unwrap_or(1), limit).ok_or_else(invalid)?;

    let campaign = find_campaign(&state, &id, "Failed to fetch vouchers").await?;
    let vouchers = state
        .store
        .list_vouchers(campaign.id, page)
        .await
        .context("Failed to fetch vouchers")?;
    Ok(Json(vouchers))
}

/// Raw query values, parsed field by field so each gets its own error.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StreamParams {
    pub count: Option<String>,
    pub batch_size: Option<String>,
}

fn validate_batch_size(raw: Option<&str>, default: usize, max: usize) -> Result<usize, ApiError> {
    let batch_size = match raw.map(str::trim) {
        None | Some("") => default,
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| ApiError::bad_request("Invalid batch size"))?,
    };
    if batch_size == 0 || batch_size > max {
        return Err(ApiError::bad_request("Invalid batch size"));
    }
    Ok(batch_size)
}

fn progress_event(progress: Progress) -> Result<Event, axum::Error> {
    Event::default().json_data(progress)
}

fn final_event(outcome: Result<StoreResult<u64>, oneshot::error::RecvError>) -> Result<Event, axum::Error> {
    let body = match outcome {
        Ok(Ok(total)) => json!({ "done": true, "totalCreated": total }),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "voucher stream failed");
            json!({ "error": "Failed to create vouchers" })
        }
        Err(_) => json!({ "error": "Failed to create vouchers" }),
    };
    Event::default().json_data(body)
}

/// Generates vouchers and reports progress as server-sent events.
///
/// Each batch yields `{"batchCreated", "totalCreated"}`; the stream ends with
/// `{"done": true, "totalCreated"}` or `{"error"}`. Dropping the connection
/// stops generation after the batch in flight.
pub async fn stream_vouchers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<StreamParams>, QueryRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::bad_request("Invalid count"))?;
    let count = params.count.as_deref().and_then(|c| c.trim().parse::<i64>().ok());
    let count = validate_count(count, state.config.max_generation_count)?;
    let batch_size = validate_batch_size(
        params.batch_size.as_deref(),
        state.config.default_batch_size,
        state.config.max_batch_size,
    )?;
    let campaign = find_campaign(&state, &id, "Failed to create vouchers").await?;

    let (progress_tx, progress_rx) = mpsc::channel(16);
    let (result_tx, result_rx) = oneshot::channel();
    let mut generator = VoucherGenerator::new(state.store.clone());
    tokio::spawn(async move {
        let result = generator
            .generate(&campaign, count, batch_size, Some(&progress_tx))
            .await;
        drop(progress_tx);
        // The receiver is gone when the client disconnected.
        let _ = result_tx.send(result);
    });

    let events = ReceiverStream::new(progress_rx)
        .map(progress_event)
        .chain(stream::once(async move { final_event(result_rx.await) }));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub async fn download_vouchers_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let vouchers = state
        .store
        .all_vouchers(id)
        .await
        .context("Failed to download CSV")?;
    if vouchers.is_empty() {
        return Err(ApiError::not_found("No vouchers found"));
    }

    let body = vouchers_to_csv(&vouchers).context("Failed to download CSV")?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment_filename(id)),
        ),
    ];
    Ok((headers, body))
}
