use axum::{extract::State, response::Json};
use serde::Serialize;

use lifelink_storage::Storage;

use crate::state::AppState;

/// Health response for the service and its dependencies
#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: String,
	pub storage: bool,
	pub predictor: bool,
	pub timestamp: i64,
}

/// GET /health - service and dependency health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	let storage = state.storage.health_check().await.unwrap_or(false);
	// A down predictor degrades matching but the cascade machinery still runs
	let predictor = state.predictor.health_check().await.unwrap_or(false);

	let status = if storage { "ok" } else { "degraded" };
	Json(HealthResponse {
		status: status.to_string(),
		storage,
		predictor,
		timestamp: chrono::Utc::now().timestamp(),
	})
}
