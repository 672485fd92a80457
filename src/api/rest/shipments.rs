use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::provider::MatchedProvider;
use crate::models::shipment::{ShipmentRequest, ShipmentStatus};
use crate::state::AppState;
use crate::store::NewShipmentRequest;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/shipment-requests",
            post(create_shipment_request).get(list_shipment_requests),
        )
        .route("/api/shipment-requests/:id", get(get_shipment_request))
        .route(
            "/api/shipment-requests/:id/status",
            patch(update_shipment_request_status),
        )
        .route("/api/shipment-requests/:id/assign", post(assign_provider))
        .route("/api/shipment-requests/:id/match", get(match_providers))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ShipmentStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub provider_id: u64,
}

// The body is optional because the legacy demo path ignores it entirely.
async fn create_shipment_request(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<NewShipmentRequest>>,
) -> Result<(StatusCode, Json<ShipmentRequest>), AppError> {
    // Legacy demo behavior, kept behind a config flag: respond with a fixed
    // sample record no matter what was posted.
    if state.demo_canned_create {
        return Ok((StatusCode::CREATED, Json(canned_shipment_request())));
    }

    let Some(Json(input)) = payload else {
        return Err(AppError::BadRequest(
            "missing or malformed shipment request body".to_string(),
        ));
    };

    if input.requestor_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "requestorName cannot be empty".to_string(),
        ));
    }
    if input.cargo_type.trim().is_empty() {
        return Err(AppError::BadRequest("cargoType cannot be empty".to_string()));
    }
    if input.weight <= 0.0 {
        return Err(AppError::BadRequest("weight must be > 0".to_string()));
    }

    let request = state.store.create_shipment_request(input);
    state
        .metrics
        .entities_created_total
        .with_label_values(&["shipment_request"])
        .inc();
    tracing::info!(
        request_id = %request.request_id,
        user_id = request.user_id,
        "shipment request created"
    );

    Ok((StatusCode::CREATED, Json(request)))
}

async fn list_shipment_requests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ShipmentRequest>> {
    Json(state.store.list_shipment_requests(query.user_id))
}

async fn get_shipment_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ShipmentRequest>, AppError> {
    let request = state
        .store
        .get_shipment_request(id)
        .ok_or_else(|| AppError::NotFound(format!("shipment request {id} not found")))?;

    Ok(Json(request))
}

async fn update_shipment_request_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ShipmentRequest>, AppError> {
    let request = state
        .store
        .update_shipment_request_status(id, payload.status)?;
    tracing::info!(request_id = %request.request_id, status = ?request.status, "shipment status updated");

    Ok(Json(request))
}

async fn assign_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<ShipmentRequest>, AppError> {
    let request = state.store.assign_provider(id, payload.provider_id)?;
    tracing::info!(
        request_id = %request.request_id,
        provider_id = payload.provider_id,
        "provider assigned"
    );

    Ok(Json(request))
}

async fn match_providers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<MatchedProvider>>, AppError> {
    let candidates = state.store.matching_candidates(id)?;
    state
        .metrics
        .match_candidates
        .observe(candidates.len() as f64);

    Ok(Json(candidates))
}

fn canned_shipment_request() -> ShipmentRequest {
    ShipmentRequest {
        id: 1,
        request_id: "REQ-1235".to_string(),
        user_id: 1,
        requestor_name: "Demo Agent".to_string(),
        company: "Demo Logistics".to_string(),
        cargo_type: "general".to_string(),
        weight: 1000.0,
        volume: Some(12.0),
        packaging_type: Some("palletized".to_string()),
        special_requirements: None,
        pickup_address: "Av. Reforma 100, CDMX".to_string(),
        delivery_address: "Blvd. Díaz Ordaz 500, Monterrey".to_string(),
        pickup_date: "2026-01-15".to_string(),
        delivery_date: "2026-01-17".to_string(),
        pickup_contact: None,
        delivery_contact: None,
        vehicle_type: "dry van".to_string(),
        vehicle_size: Some("53ft".to_string()),
        additional_equipment: vec![],
        status: ShipmentStatus::Pending,
        assigned_provider_id: None,
        created_at: Utc::now(),
    }
}
