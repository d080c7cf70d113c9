// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::{config::Config, models::response::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub storage: &'static str,
}

/// Liveness check. Reports which storage backend the process runs on.
pub async fn health(State(config): State<Config>) -> impl IntoResponse {
    let storage = if config.database_url.is_some() { "postgres" } else { "memory" };
    Json(ApiResponse::success(HealthPayload { storage }))
}
