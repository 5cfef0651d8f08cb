// libs/scheduling-cell/tests/handlers_test.rs
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use resource_cell::RegistryService;
use scheduling_cell::{booking_routes, BookingEngine, BookingState};
use shared_config::AppConfig;
use shared_identity::StaticVerifier;
use shared_models::{AvailabilityRule, ResourceKind};
use shared_store::{MemoryStore, ScheduleStore};

fn test_config() -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        account_service_url: String::new(),
        documents_service_url: String::new(),
        max_booking_hours: 12,
        outbox_poll_interval_secs: 1,
        outbox_publish_batch: 32,
        storage_retry_attempts: 3,
        storage_retry_base_ms: 1,
    }
}

// 2025-06-02 is a Monday.
fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
}

struct Harness {
    store: Arc<MemoryStore>,
    engine: Arc<BookingEngine>,
    resource_id: Uuid,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let registry = RegistryService::new(store.clone() as Arc<dyn ScheduleStore>);
        let resource = registry
            .register_resource(
                ResourceKind::Doctor,
                "Dr. Petrov".to_string(),
                vec![AvailabilityRule {
                    day_of_week: 1,
                    start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                    slot_minutes: 30,
                }],
            )
            .await
            .unwrap();

        let engine = Arc::new(BookingEngine::new(store.clone(), &test_config()));
        Self {
            store,
            engine,
            resource_id: resource.id,
        }
    }

    /// Router authenticating every request as the given account.
    fn router_as(&self, account_id: &str, role: Option<&str>) -> Router {
        booking_routes(BookingState {
            engine: self.engine.clone(),
            identity: Arc::new(StaticVerifier::new(account_id, role)),
        })
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer test-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn booking_round_trip_over_http() {
    let harness = Harness::new().await;
    let router = harness.router_as("acct-a", Some("patient"));

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/",
            json!({
                "resource_id": harness.resource_id,
                "start_time": at(9, 0),
                "end_time": at(9, 30),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["booking"]["status"], "confirmed");

    let response = router
        .oneshot(empty_request(Method::GET, &format!("/{}", booking_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn overlap_maps_to_conflict_status() {
    let harness = Harness::new().await;
    let router = harness.router_as("acct-a", Some("patient"));

    let first = json_request(
        Method::POST,
        "/",
        json!({
            "resource_id": harness.resource_id,
            "start_time": at(10, 0),
            "end_time": at(10, 30),
        }),
    );
    assert_eq!(
        router.clone().oneshot(first).await.unwrap().status(),
        StatusCode::CREATED
    );

    let overlapping = json_request(
        Method::POST,
        "/",
        json!({
            "resource_id": harness.resource_id,
            "start_time": at(10, 15),
            "end_time": at(10, 45),
        }),
    );
    let response = router.oneshot(overlapping).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn uncovered_interval_maps_to_bad_request() {
    let harness = Harness::new().await;
    let router = harness.router_as("acct-a", Some("patient"));

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/",
            json!({
                "resource_id": harness.resource_id,
                "start_time": at(20, 0),
                "end_time": at(20, 30),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completion_is_staff_only() {
    let harness = Harness::new().await;
    let patient = harness.router_as("acct-a", Some("patient"));
    let staff = harness.router_as("acct-staff", Some("manager"));

    let response = patient
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/",
            json!({
                "resource_id": harness.resource_id,
                "start_time": at(11, 0),
                "end_time": at(11, 30),
            }),
        ))
        .await
        .unwrap();
    let booking_id = body_json(response).await["booking"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let denied = patient
        .oneshot(empty_request(
            Method::POST,
            &format!("/{}/complete", booking_id),
        ))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = staff
        .oneshot(empty_request(
            Method::POST,
            &format!("/{}/complete", booking_id),
        ))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn strangers_cannot_cancel_others_bookings() {
    let harness = Harness::new().await;
    let owner = harness.router_as("acct-a", Some("patient"));
    let stranger = harness.router_as("acct-b", Some("patient"));

    let response = owner
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/",
            json!({
                "resource_id": harness.resource_id,
                "start_time": at(12, 0),
                "end_time": at(12, 30),
            }),
        ))
        .await
        .unwrap();
    let booking_id = body_json(response).await["booking"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let denied = stranger
        .oneshot(empty_request(
            Method::POST,
            &format!("/{}/cancel", booking_id),
        ))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = owner
        .oneshot(empty_request(
            Method::POST,
            &format!("/{}/cancel", booking_id),
        ))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn slots_endpoint_reflects_bookings() {
    let harness = Harness::new().await;
    let router = harness.router_as("acct-a", Some("patient"));

    router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/",
            json!({
                "resource_id": harness.resource_id,
                "start_time": at(9, 0),
                "end_time": at(9, 30),
            }),
        ))
        .await
        .unwrap();

    let uri = format!(
        "/slots?resource_id={}&from={}&to={}",
        harness.resource_id,
        at(9, 0).to_rfc3339().replace('+', "%2B"),
        at(10, 0).to_rfc3339().replace('+', "%2B"),
    );
    let response = router.oneshot(empty_request(Method::GET, &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);

    // Store-level check: one confirmed booking backs the missing slot.
    let stored = harness
        .store
        .confirmed_bookings_in_window(harness.resource_id, at(9, 0), at(10, 0))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}
