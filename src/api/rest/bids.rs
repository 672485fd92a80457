use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::bid::{Bid, BidStatus};
use crate::state::AppState;
use crate::store::NewBid;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/bids", post(create_bid).get(list_bids))
        .route("/api/bids/:id", get(get_bid))
        .route("/api/bids/:id/status", patch(update_bid_status))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub shipment_request_id: Option<u64>,
    pub provider_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BidStatus,
}

async fn create_bid(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewBid>,
) -> Result<(StatusCode, Json<Bid>), AppError> {
    if payload.price <= 0.0 {
        return Err(AppError::BadRequest("price must be > 0".to_string()));
    }
    if payload.transit_time <= 0.0 {
        return Err(AppError::BadRequest("transitTime must be > 0".to_string()));
    }

    let bid = state.store.create_bid(payload)?;
    state
        .metrics
        .entities_created_total
        .with_label_values(&["bid"])
        .inc();
    tracing::info!(
        bid_id = bid.id,
        shipment_request_id = bid.shipment_request_id,
        provider_id = bid.provider_id,
        price = bid.price,
        "bid submitted"
    );

    Ok((StatusCode::CREATED, Json(bid)))
}

async fn list_bids(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Bid>> {
    Json(
        state
            .store
            .list_bids(query.shipment_request_id, query.provider_id),
    )
}

async fn get_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Bid>, AppError> {
    let bid = state
        .store
        .get_bid(id)
        .ok_or_else(|| AppError::NotFound(format!("bid {id} not found")))?;

    Ok(Json(bid))
}

async fn update_bid_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Bid>, AppError> {
    let bid = state.store.update_bid_status(id, payload.status)?;

    let outcome = match bid.status {
        BidStatus::Accepted => "accepted",
        BidStatus::Rejected => "rejected",
        BidStatus::Pending => "pending",
    };
    state
        .metrics
        .bid_decisions_total
        .with_label_values(&[outcome])
        .inc();
    tracing::info!(bid_id = id, outcome, "bid decided");

    Ok(Json(bid))
}
