use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use freight_exchange::api::rest::router;
use freight_exchange::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

fn setup() -> axum::Router {
    router(Arc::new(AppState::new(false)))
}

fn setup_demo() -> axum::Router {
    router(Arc::new(AppState::new(true)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn patch_request(uri: &str, body: Value) -> Request<Body> {
    json_request("PATCH", uri, body)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn sample_provider_body(user_id: u64) -> Value {
    json!({
        "userId": user_id,
        "companyName": "Transportes del Valle",
        "rfc": "TVA010101AAA",
        "vehicleTypes": ["dry van", "flatbed"],
        "serviceAreas": ["CDMX", "Monterrey"],
        "currency": "MXN",
        "certifications": ["CTPAT"],
        "onTimeRate": 0.93,
        "responseTimeHours": 2.5,
        "completedJobs": 17
    })
}

fn sample_request_body(user_id: u64) -> Value {
    json!({
        "userId": user_id,
        "requestorName": "Ana Torres",
        "company": "Acme MX",
        "cargoType": "electronics",
        "weight": 1200.0,
        "volume": 14.0,
        "pickupAddress": "Av. Industria 45, Monterrey",
        "deliveryAddress": "Calle 8 #120, CDMX",
        "pickupDate": "2026-09-01",
        "deliveryDate": "2026-09-03",
        "vehicleType": "dry van",
        "vehicleSize": "53ft"
    })
}

async fn create_provider(app: &axum::Router, user_id: u64) -> u64 {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/providers",
            sample_provider_body(user_id),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await["id"].as_u64().unwrap()
}

async fn approve_provider(app: &axum::Router, id: u64) {
    let res = app
        .clone()
        .oneshot(patch_request(
            &format!("/api/providers/{id}/status"),
            json!({ "status": "Approved" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

async fn create_shipment_request(app: &axum::Router, user_id: u64) -> u64 {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/shipment-requests",
            sample_request_body(user_id),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await["id"].as_u64().unwrap()
}

#[tokio::test]
async fn health_returns_ok_with_zero_counts() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["users"], 0);
    assert_eq!(body["providers"], 0);
    assert_eq!(body["shipment_requests"], 0);
    assert_eq!(body["bids"], 0);
    assert_eq!(body["feedback"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("match_candidates"));
}

#[tokio::test]
async fn login_creates_user_and_is_idempotent() {
    let app = setup();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({ "username": "laura", "role": "Agent" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["user"]["username"], "laura");
    assert_eq!(body["user"]["role"], "Agent");
    assert_eq!(body["user"]["companyName"], "Independent");
    let first_id = body["user"]["id"].as_u64().unwrap();

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({ "username": "laura", "role": "Agent" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["user"]["id"].as_u64().unwrap(), first_id);
}

#[tokio::test]
async fn login_empty_username_returns_400() {
    let app = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({ "username": "   ", "role": "Provider" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_provider_starts_pending_with_zero_score() {
    let app = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/api/providers",
            sample_provider_body(1),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);

    let body = body_json(res).await;
    assert_eq!(body["companyName"], "Transportes del Valle");
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["score"], 0.0);
    assert!(body["id"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn create_provider_empty_rfc_returns_400() {
    let app = setup();
    let mut body = sample_provider_body(1);
    body["rfc"] = json!("");

    let res = app
        .oneshot(json_request("POST", "/api/providers", body))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_missing_provider_returns_404() {
    let app = setup();
    let res = app.oneshot(get_request("/api/providers/99")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_status_on_missing_provider_returns_404() {
    let app = setup();
    let res = app
        .oneshot(patch_request(
            "/api/providers/99/status",
            json!({ "status": "Approved" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn provider_ids_increase_monotonically() {
    let app = setup();

    let first = create_provider(&app, 1).await;
    let second = create_provider(&app, 2).await;
    let third = create_provider(&app, 3).await;

    assert!(first < second);
    assert!(second < third);
}

#[tokio::test]
async fn create_shipment_request_derives_request_id() {
    let app = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/api/shipment-requests",
            sample_request_body(1),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);

    let body = body_json(res).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["requestId"], "REQ-1235");
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["assignedProviderId"], Value::Null);
}

#[tokio::test]
async fn create_shipment_request_rejects_nonpositive_weight() {
    let app = setup();
    let mut body = sample_request_body(1);
    body["weight"] = json!(0.0);

    let res = app
        .oneshot(json_request("POST", "/api/shipment-requests", body))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_missing_shipment_request_returns_404() {
    // The legacy store substituted the first stored record here; misses are
    // now surfaced as real 404s.
    let app = setup();
    create_shipment_request(&app, 1).await;

    let res = app
        .oneshot(get_request("/api/shipment-requests/99"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_shipment_requests_filters_by_user() {
    let app = setup();
    create_shipment_request(&app, 1).await;
    create_shipment_request(&app, 2).await;
    create_shipment_request(&app, 1).await;

    let res = app
        .clone()
        .oneshot(get_request("/api/shipment-requests?userId=1"))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let res = app
        .oneshot(get_request("/api/shipment-requests"))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn assign_provider_marks_request_assigned() {
    let app = setup();
    let provider_id = create_provider(&app, 1).await;
    let request_id = create_shipment_request(&app, 2).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/shipment-requests/{request_id}/assign"),
            json!({ "providerId": provider_id }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["status"], "Assigned");
    assert_eq!(body["assignedProviderId"].as_u64().unwrap(), provider_id);
}

#[tokio::test]
async fn assign_unknown_provider_fails_without_mutation() {
    let app = setup();
    let request_id = create_shipment_request(&app, 1).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/shipment-requests/{request_id}/assign"),
            json!({ "providerId": 99 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .oneshot(get_request(&format!("/api/shipment-requests/{request_id}")))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["assignedProviderId"], Value::Null);
}

#[tokio::test]
async fn match_returns_approved_providers_sorted_descending() {
    let app = setup();
    let request_id = create_shipment_request(&app, 1).await;

    let a = create_provider(&app, 10).await;
    let _unapproved = create_provider(&app, 11).await;
    let c = create_provider(&app, 12).await;
    approve_provider(&app, a).await;
    approve_provider(&app, c).await;

    let res = app
        .oneshot(get_request(&format!(
            "/api/shipment-requests/{request_id}/match"
        )))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let candidates = body.as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["matchPercentage"], 95);
    assert_eq!(candidates[1]["matchPercentage"], 88);
    for candidate in candidates {
        assert_eq!(candidate["status"], "Approved");
    }
}

#[tokio::test]
async fn match_on_missing_request_returns_404() {
    let app = setup();
    let res = app
        .oneshot(get_request("/api/shipment-requests/42/match"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bid_lifecycle_pending_to_accepted() {
    let app = setup();
    let provider_id = create_provider(&app, 1).await;
    let request_id = create_shipment_request(&app, 2).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bids",
            json!({
                "shipmentRequestId": request_id,
                "providerId": provider_id,
                "price": 2500.0,
                "currency": "USD",
                "transitTime": 2.0,
                "transitTimeUnit": "days",
                "availability": "immediate"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let bid = body_json(res).await;
    assert_eq!(bid["status"], "Pending");
    assert_eq!(bid["price"], 2500.0);
    let bid_id = bid["id"].as_u64().unwrap();

    let res = app
        .clone()
        .oneshot(patch_request(
            &format!("/api/bids/{bid_id}/status"),
            json!({ "status": "Accepted" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "Accepted");

    // Decisions are terminal.
    let res = app
        .oneshot(patch_request(
            &format!("/api/bids/{bid_id}/status"),
            json!({ "status": "Rejected" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn bid_on_unknown_request_returns_404() {
    let app = setup();
    let provider_id = create_provider(&app, 1).await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/bids",
            json!({
                "shipmentRequestId": 42,
                "providerId": provider_id,
                "price": 1000.0,
                "currency": "MXN",
                "transitTime": 1.0,
                "transitTimeUnit": "days",
                "availability": "next week"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_bids_filters_by_request_and_provider() {
    let app = setup();
    let p1 = create_provider(&app, 1).await;
    let p2 = create_provider(&app, 2).await;
    let request_id = create_shipment_request(&app, 3).await;

    for provider_id in [p1, p2] {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/bids",
                json!({
                    "shipmentRequestId": request_id,
                    "providerId": provider_id,
                    "price": 1800.0,
                    "currency": "MXN",
                    "transitTime": 3.0,
                    "transitTimeUnit": "days",
                    "availability": "immediate"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/bids?shipmentRequestId={request_id}"
        )))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 2);

    let res = app
        .oneshot(get_request(&format!("/api/bids?providerId={p1}")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn feedback_updates_provider_score_to_mean_of_ratings() {
    let app = setup();
    let provider_id = create_provider(&app, 1).await;
    let request_id = create_shipment_request(&app, 2).await;

    for rating in [5, 2] {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/feedback",
                json!({
                    "shipmentRequestId": request_id,
                    "providerId": provider_id,
                    "rating": rating,
                    "onTimePerformance": true,
                    "cargoCondition": "intact",
                    "wouldReuse": true
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app
        .oneshot(get_request(&format!("/api/providers/{provider_id}")))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["score"], 3.5);
}

#[tokio::test]
async fn feedback_rating_out_of_range_returns_400() {
    let app = setup();
    let provider_id = create_provider(&app, 1).await;
    let request_id = create_shipment_request(&app, 2).await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            json!({
                "shipmentRequestId": request_id,
                "providerId": provider_id,
                "rating": 0,
                "onTimePerformance": true,
                "cargoCondition": "intact",
                "wouldReuse": false
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn top_providers_respects_limit_and_score_order() {
    let app = setup();
    let request_id = create_shipment_request(&app, 1).await;

    let low = create_provider(&app, 10).await;
    let high = create_provider(&app, 11).await;
    approve_provider(&app, low).await;
    approve_provider(&app, high).await;

    for (provider_id, rating) in [(low, 2), (high, 5)] {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/feedback",
                json!({
                    "shipmentRequestId": request_id,
                    "providerId": provider_id,
                    "rating": rating,
                    "onTimePerformance": true,
                    "cargoCondition": "intact",
                    "wouldReuse": true
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app
        .oneshot(get_request("/api/providers/top?limit=1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let top = body.as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["id"].as_u64().unwrap(), high);
    assert_eq!(top[0]["score"], 5.0);
}

#[tokio::test]
async fn demo_mode_returns_canned_shipment_request() {
    let app = setup_demo();

    // The body is ignored entirely in demo mode, even when it is garbage.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/shipment-requests",
            json!({ "whatever": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = body_json(res).await;
    assert_eq!(body["requestId"], "REQ-1235");
    assert_eq!(body["status"], "Pending");

    // And nothing was stored.
    let res = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(body_json(res).await["shipment_requests"], 0);
}
