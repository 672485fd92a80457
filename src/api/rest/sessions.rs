use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/login", post(login))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub role: Role,
    pub company_name: Option<String>,
}

// Mock authentication: looks the user up by username and creates one on the
// first login. No credential is ever checked.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::BadRequest("username cannot be empty".to_string()));
    }

    let known_before = state.store.counts().users;
    let user = state
        .store
        .login(payload.username.trim(), payload.role, payload.company_name);

    if state.store.counts().users > known_before {
        state
            .metrics
            .entities_created_total
            .with_label_values(&["user"])
            .inc();
        tracing::info!(user_id = user.id, username = %user.username, "user created on first login");
    }

    Ok(Json(json!({ "user": user })))
}
