use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::feedback::Feedback;
use crate::state::AppState;
use crate::store::NewFeedback;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feedback", post(create_feedback).get(list_feedback))
        .route("/api/feedback/:id", get(get_feedback))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub shipment_request_id: Option<u64>,
    pub provider_id: Option<u64>,
}

async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewFeedback>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let provider_id = payload.provider_id;
    let feedback = state.store.create_feedback(payload)?;
    state
        .metrics
        .entities_created_total
        .with_label_values(&["feedback"])
        .inc();

    // Score was just recomputed from the full rating history.
    if let Some(provider) = state.store.get_provider(provider_id) {
        state
            .metrics
            .provider_score
            .with_label_values(&[&provider_id.to_string()])
            .set(provider.score);
        tracing::info!(
            provider_id,
            rating = feedback.rating,
            score = provider.score,
            "feedback recorded"
        );
    }

    Ok((StatusCode::CREATED, Json(feedback)))
}

async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Feedback>> {
    Json(
        state
            .store
            .list_feedback(query.shipment_request_id, query.provider_id),
    )
}

async fn get_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Feedback>, AppError> {
    let feedback = state
        .store
        .get_feedback(id)
        .ok_or_else(|| AppError::NotFound(format!("feedback {id} not found")))?;

    Ok(Json(feedback))
}
