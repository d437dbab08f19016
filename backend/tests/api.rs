use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use backend::api::{self, AppState};
use backend::config::AppConfig;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use store::{
    Campaign, MemoryStore, NewCampaign, PageRequest, StoreError, StoreResult, Voucher, VoucherPage,
    VoucherStore,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Campaign storage works; voucher writes and campaign listing fail.
#[derive(Default)]
struct BrokenStore {
    inner: MemoryStore,
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl VoucherStore for BrokenStore {
    async fn create_campaign(&self, campaign: NewCampaign) -> StoreResult<Campaign> {
        self.inner.create_campaign(campaign).await
    }

    async fn list_campaigns(&self) -> StoreResult<Vec<Campaign>> {
        Err(unavailable())
    }

    async fn get_campaign(&self, id: Uuid) -> StoreResult<Option<Campaign>> {
        self.inner.get_campaign(id).await
    }

    async fn find_campaign_by_prefix(&self, prefix: &str) -> StoreResult<Option<Campaign>> {
        self.inner.find_campaign_by_prefix(prefix).await
    }

    async fn delete_campaign(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_campaign(id).await
    }

    async fn insert_vouchers(&self, _campaign_id: Uuid, _codes: &[String]) -> StoreResult<u64> {
        Err(unavailable())
    }

    async fn list_vouchers(&self, campaign_id: Uuid, page: PageRequest) -> StoreResult<VoucherPage> {
        self.inner.list_vouchers(campaign_id, page).await
    }

    async fn all_vouchers(&self, campaign_id: Uuid) -> StoreResult<Vec<Voucher>> {
        self.inner.all_vouchers(campaign_id).await
    }

    async fn delete_voucher(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_voucher(id).await
    }
}

struct TestApp {
    router: Router,
    store: Arc<dyn VoucherStore>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    fn with_store(store: Arc<dyn VoucherStore>, config: AppConfig) -> Self {
        let router = api::router(AppState::new(store.clone(), config));
        Self { router, store }
    }

    async fn events(&self, uri: &str) -> Vec<Value> {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, headers, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");

        String::from_utf8(body)
            .unwrap()
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|data| serde_json::from_str(data.trim()).unwrap())
            .collect()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::delete(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn create_campaign(&self, prefix: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/campaigns",
                json!({
                    "prefix": prefix,
                    "amount": 15,
                    "currency": "eur",
                    "validFrom": "2025-01-01",
                    "validTo": "2025-12-31",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn generate(&self, id: &str, count: u64) -> u64 {
        let (status, body) = self
            .json(Method::POST, &format!("/campaigns/{id}/vouchers"), json!({ "count": count }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["created"].as_u64().unwrap()
    }
}

#[tokio::test]
async fn root_reports_running() {
    let app = TestApp::new();
    let request = Request::get("/").body(Body::empty()).unwrap();
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Voucher API running");

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn creates_lists_and_fetches_campaigns() {
    let app = TestApp::new();
    let id = app.create_campaign("SPRING").await;

    let (status, body) = app.get(&format!("/campaigns/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prefix"], "SPRING");
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["amount"], 15.0);
    assert_eq!(body["validFrom"], "2025-01-01T00:00:00Z");

    let (status, body) = app.get("/campaigns").await;
    assert_eq!(status, StatusCode::OK);
    let campaigns = body.as_array().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["id"], id);
}

#[tokio::test]
async fn rejects_invalid_campaigns() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/campaigns",
            json!({
                "prefix": "SALE",
                "amount": 10,
                "currency": "USD",
                "validFrom": "2025-06-01",
                "validTo": "2025-05-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "End date cannot be before start date");

    let (status, body) = app.json(Method::POST, "/campaigns", json!({ "amount": 10 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prefix is required");

    let request = Request::post("/campaigns")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let app = TestApp::new();

    let (status, body) = app.get("/campaigns/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid id");

    let missing = Uuid::new_v4();
    let (status, body) = app.get(&format!("/campaigns/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Campaign not found");

    let (status, _) = app
        .json(Method::POST, &format!("/campaigns/{missing}/vouchers"), json!({ "count": 5 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generation_validates_count() {
    let app = TestApp::new();
    let id = app.create_campaign("COUNT").await;
    let uri = format!("/campaigns/{id}/vouchers");

    for body in [json!({}), json!({ "count": 0 }), json!({ "count": -3 }), json!({ "count": "ten" })] {
        let (status, response) = app.json(Method::POST, &uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Invalid count");
    }

    let (status, response) = app
        .json(Method::POST, &uri, json!({ "count": 2_000_000 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Count cannot exceed 1000000");
}

#[tokio::test]
async fn generates_and_paginates_vouchers() {
    let app = TestApp::new();
    let id = app.create_campaign("PAGE").await;
    assert_eq!(app.generate(&id, 120).await, 120);

    let (status, body) = app.get(&format!("/campaigns/{id}/vouchers?page=2&limit=50")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 120);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 50);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 50);
    assert!(data[0]["code"].as_str().unwrap().starts_with("PAGE-"));
    assert_eq!(data[0]["campaignId"], id);

    let (_, body) = app.get(&format!("/campaigns/{id}/vouchers?page=3&limit=50")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 20);

    let (_, body) = app.get(&format!("/campaigns/{id}/vouchers")).await;
    assert_eq!(body["limit"], 50);
    assert_eq!(body["page"], 1);
}

#[tokio::test]
async fn pagination_bounds() {
    let app = TestApp::with_config(AppConfig {
        max_page_size: 10,
        default_page_size: 5,
        ..AppConfig::default()
    });
    let id = app.create_campaign("BOUNDS").await;
    app.generate(&id, 30).await;

    let (status, body) = app.get(&format!("/campaigns/{id}/vouchers?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid pagination");

    let (status, _) = app.get(&format!("/campaigns/{id}/vouchers?limit=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get(&format!("/campaigns/{id}/vouchers?limit=500")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn streams_generation_progress() {
    let app = TestApp::new();
    let id = app.create_campaign("STREAM").await;

    let events = app
        .events(&format!("/campaigns/{id}/vouchers/stream?count=250&batchSize=100"))
        .await;

    assert_eq!(events.len(), 4);
    assert_eq!(events[0], json!({ "batchCreated": 100, "totalCreated": 100 }));
    assert_eq!(events[2], json!({ "batchCreated": 50, "totalCreated": 250 }));
    assert_eq!(events[3], json!({ "done": true, "totalCreated": 250 }));

    assert_eq!(app.store.all_vouchers(id.parse().unwrap()).await.unwrap().len(), 250);
}

#[tokio::test]
async fn stream_rejects_bad_parameters_before_starting() {
    let app = TestApp::new();
    let id = app.create_campaign("BADSTREAM").await;

    let (status, body) = app.get(&format!("/campaigns/{id}/vouchers/stream?count=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid count");

    let (status, body) = app
        .get(&format!("/campaigns/{id}/vouchers/stream?count=10&batchSize=0"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid batch size");

    for batch_size in ["abc", "-5", "20000"] {
        let (status, body) = app
            .get(&format!("/campaigns/{id}/vouchers/stream?count=10&batchSize={batch_size}"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "batchSize={batch_size}");
        assert_eq!(body["error"], "Invalid batch size");
    }

    let (status, body) = app
        .get(&format!("/campaigns/{id}/vouchers/stream?count=ten&batchSize=10"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid count");

    let missing = Uuid::new_v4();
    let (status, _) = app
        .get(&format!("/campaigns/{missing}/vouchers/stream?count=10"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stream_ends_with_error_event_when_store_fails() {
    let app = TestApp::with_store(Arc::new(BrokenStore::default()), AppConfig::default());
    let id = app.create_campaign("FAIL").await;

    let events = app
        .events(&format!("/campaigns/{id}/vouchers/stream?count=10&batchSize=5"))
        .await;
    assert_eq!(events, [json!({ "error": "Failed to create vouchers" })]);
}

#[tokio::test]
async fn store_failures_answer_500_with_endpoint_message() {
    let app = TestApp::with_store(Arc::new(BrokenStore::default()), AppConfig::default());
    let id = app.create_campaign("FAIL").await;

    let (status, body) = app.get("/campaigns").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch campaigns" }));

    let (status, body) = app
        .json(Method::POST, &format!("/campaigns/{id}/vouchers"), json!({ "count": 3 }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to create vouchers" }));
}

#[tokio::test]
async fn exports_vouchers_as_csv() {
    let app = TestApp::new();
    let id = app.create_campaign("CSV").await;

    let (status, body) = app.get(&format!("/campaigns/{id}/vouchers/csv")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No vouchers found");

    app.generate(&id, 3).await;
    let request = Request::get(format!("/campaigns/{id}/vouchers/csv"))
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"vouchers_{id}.csv\"").as_str()
    );

    let csv = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "id,code,campaignId");
    assert!(lines[1..].iter().all(|line| line.ends_with(&id)));
}

#[tokio::test]
async fn deletes_single_vouchers() {
    let app = TestApp::new();
    let id = app.create_campaign("DEL").await;
    app.generate(&id, 2).await;

    let (_, body) = app.get(&format!("/campaigns/{id}/vouchers")).await;
    let voucher_id = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app.delete(&format!("/vouchers/{voucher_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Voucher deleted");

    let (status, body) = app.delete(&format!("/vouchers/{voucher_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Voucher not found");

    let (_, body) = app.get(&format!("/campaigns/{id}/vouchers")).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn deleting_campaign_removes_its_vouchers() {
    let app = TestApp::new();
    let id = app.create_campaign("GONE").await;
    app.generate(&id, 10).await;

    let (status, body) = app.delete(&format!("/campaigns/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Campaign deleted");

    assert!(app.store.all_vouchers(id.parse().unwrap()).await.unwrap().is_empty());
    let (status, _) = app.get(&format!("/campaigns/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/campaigns/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn allows_cross_origin_requests() {
    let app = TestApp::new();
    let request = Request::get("/campaigns")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
