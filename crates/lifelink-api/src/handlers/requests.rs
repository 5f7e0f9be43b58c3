use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use serde::Serialize;
use tracing::info;

use lifelink_service::RequestServiceError;
use lifelink_types::requests::response::RequestResponse;
use lifelink_types::CreateRequestPayload;

use crate::handlers::common::ErrorResponse;
use crate::state::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn service_error(e: RequestServiceError) -> HandlerError {
	let (status, code) = match &e {
		RequestServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
		RequestServiceError::DuplicateActive { .. } => {
			(StatusCode::BAD_REQUEST, "DUPLICATE_REQUEST")
		},
		RequestServiceError::PatientNotFound { .. }
		| RequestServiceError::HospitalNotFound { .. }
		| RequestServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
		RequestServiceError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
	};
	(status, Json(ErrorResponse::new(code, e.to_string())))
}

/// Response for request creation: the request plus its frozen ranking
#[derive(Debug, Serialize)]
pub struct CreateRequestResponse {
	pub message: String,
	pub request: RequestResponse,
}

/// POST /api/v1/requests - create a request and start its cascade
pub async fn post_request(
	State(state): State<AppState>,
	Json(payload): Json<CreateRequestPayload>,
) -> Result<(StatusCode, Json<CreateRequestResponse>), HandlerError> {
	info!(
		patient_id = %payload.patient_id,
		hospital_id = %payload.hospital_id,
		organ = ?payload.organ,
		"Received request submission"
	);

	let request = state
		.request_service
		.submit_request(&payload)
		.await
		.map_err(service_error)?;

	Ok((
		StatusCode::CREATED,
		Json(CreateRequestResponse {
			message: "Request created, donor cascade started".to_string(),
			request: RequestResponse::from(&request),
		}),
	))
}

/// GET /api/v1/requests/{id} - fetch one request
pub async fn get_request(
	State(state): State<AppState>,
	Path(request_id): Path<String>,
) -> Result<Json<RequestResponse>, HandlerError> {
	let request = state
		.request_service
		.get_request(&request_id)
		.await
		.map_err(service_error)?
		.ok_or_else(|| {
			(
				StatusCode::NOT_FOUND,
				Json(ErrorResponse::new(
					"NOT_FOUND",
					format!("request not found: {}", request_id),
				)),
			)
		})?;
	Ok(Json(RequestResponse::from(&request)))
}

/// GET /api/v1/hospitals/{id}/requests - all requests for a hospital
pub async fn get_hospital_requests(
	State(state): State<AppState>,
	Path(hospital_id): Path<String>,
) -> Result<Json<Vec<RequestResponse>>, HandlerError> {
	let requests = state
		.request_service
		.get_requests_by_hospital(&hospital_id)
		.await
		.map_err(service_error)?;
	Ok(Json(requests.iter().map(RequestResponse::from).collect()))
}

/// DELETE /api/v1/requests/{id} - retract a request
pub async fn delete_request(
	State(state): State<AppState>,
	Path(request_id): Path<String>,
) -> Result<Json<serde_json::Value>, HandlerError> {
	state
		.request_service
		.delete_request(&request_id)
		.await
		.map_err(service_error)?;
	Ok(Json(serde_json::json!({
		"message": "Request deleted"
	})))
}
