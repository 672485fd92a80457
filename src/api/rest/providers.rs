use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::provider::{Provider, ProviderStatus};
use crate::state::AppState;
use crate::store::NewProvider;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/providers", post(create_provider).get(list_providers))
        .route("/api/providers/top", get(top_providers))
        .route("/api/providers/:id", get(get_provider))
        .route("/api/providers/:id/status", patch(update_provider_status))
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ProviderStatus,
}

async fn create_provider(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewProvider>,
) -> Result<(StatusCode, Json<Provider>), AppError> {
    if payload.company_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "companyName cannot be empty".to_string(),
        ));
    }
    if payload.rfc.trim().is_empty() {
        return Err(AppError::BadRequest("rfc cannot be empty".to_string()));
    }

    let provider = state.store.create_provider(payload);
    state
        .metrics
        .entities_created_total
        .with_label_values(&["provider"])
        .inc();
    tracing::info!(provider_id = provider.id, company = %provider.company_name, "provider registered");

    Ok((StatusCode::CREATED, Json(provider)))
}

async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<Provider>> {
    Json(state.store.list_providers())
}

async fn top_providers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<Provider>>, AppError> {
    let limit = query.limit.unwrap_or(3);
    if limit == 0 {
        return Err(AppError::BadRequest("limit must be > 0".to_string()));
    }

    Ok(Json(state.store.top_providers(limit)))
}

async fn get_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Provider>, AppError> {
    let provider = state
        .store
        .get_provider(id)
        .ok_or_else(|| AppError::NotFound(format!("provider {id} not found")))?;

    Ok(Json(provider))
}

async fn update_provider_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Provider>, AppError> {
    let provider = state.store.update_provider_status(id, payload.status)?;
    tracing::info!(provider_id = id, status = ?provider.status, "provider status updated");

    Ok(Json(provider))
}
