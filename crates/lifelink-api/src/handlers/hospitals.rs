use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use serde::{Deserialize, Serialize};

use lifelink_storage::HospitalStorage;
use lifelink_types::storage::StorageError;
use lifelink_types::OutcomeEntry;

use crate::handlers::common::ErrorResponse;
use crate::state::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn storage_error(e: StorageError) -> HandlerError {
	match e {
		StorageError::NotFound { id } => (
			StatusCode::NOT_FOUND,
			Json(ErrorResponse::new(
				"NOT_FOUND",
				format!("hospital not found: {}", id),
			)),
		),
		e => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(ErrorResponse::new("STORAGE_ERROR", e.to_string())),
		),
	}
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
	pub notifications: Vec<OutcomeEntry>,
}

/// Acknowledge payload: clear one request's notifications, or all of them
#[derive(Debug, Deserialize)]
pub struct ClearNotificationsPayload {
	#[serde(default)]
	pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearNotificationsResponse {
	pub message: String,
	pub cleared: usize,
}

/// GET /api/v1/hospitals/{id}/notifications - unacknowledged outcomes
pub async fn get_hospital_notifications(
	State(state): State<AppState>,
	Path(hospital_id): Path<String>,
) -> Result<Json<NotificationsResponse>, HandlerError> {
	let notifications = state
		.storage
		.get_pending_notifications(&hospital_id)
		.await
		.map_err(storage_error)?;
	Ok(Json(NotificationsResponse { notifications }))
}

/// POST /api/v1/hospitals/{id}/notifications/clear - explicit acknowledgment
pub async fn clear_hospital_notifications(
	State(state): State<AppState>,
	Path(hospital_id): Path<String>,
	Json(payload): Json<ClearNotificationsPayload>,
) -> Result<Json<ClearNotificationsResponse>, HandlerError> {
	let cleared = state
		.storage
		.acknowledge_notifications(&hospital_id, payload.request_id.as_deref())
		.await
		.map_err(storage_error)?;
	Ok(Json(ClearNotificationsResponse {
		message: "Pending notifications cleared".to_string(),
		cleared,
	}))
}
