use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use lifelink_service::SignalDisposition;
use lifelink_storage::DonorStorage;
use lifelink_types::storage::StorageError;
use lifelink_types::{DonorAction, DonorSignal, PendingOffer};

use crate::handlers::common::ErrorResponse;
use crate::state::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn storage_error(e: StorageError) -> HandlerError {
	match e {
		StorageError::NotFound { id } => (
			StatusCode::NOT_FOUND,
			Json(ErrorResponse::new(
				"NOT_FOUND",
				format!("donor not found: {}", id),
			)),
		),
		e => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(ErrorResponse::new("STORAGE_ERROR", e.to_string())),
		),
	}
}

#[derive(Debug, Serialize)]
pub struct DonorOffersResponse {
	pub offers: Vec<PendingOffer>,
}

/// REST fallback for answering an offer without a live channel
#[derive(Debug, Deserialize)]
pub struct RespondPayload {
	pub request_id: String,
	pub action: DonorAction,
}

#[derive(Debug, Serialize)]
pub struct RespondResponse {
	pub message: String,
	pub delivered: bool,
	pub already_finalized: bool,
}

/// GET /api/v1/donors/{id}/offers - the donor's durable pending queue
pub async fn get_donor_offers(
	State(state): State<AppState>,
	Path(donor_id): Path<String>,
) -> Result<Json<DonorOffersResponse>, HandlerError> {
	let donor = state
		.storage
		.get_donor(&donor_id)
		.await
		.map_err(storage_error)?
		.ok_or_else(|| {
			(
				StatusCode::NOT_FOUND,
				Json(ErrorResponse::new(
					"NOT_FOUND",
					format!("donor not found: {}", donor_id),
				)),
			)
		})?;
	Ok(Json(DonorOffersResponse {
		offers: donor.pending_offers,
	}))
}

/// POST /api/v1/donors/{id}/respond - deliver a donor signal over REST
pub async fn donor_respond(
	State(state): State<AppState>,
	Path(donor_id): Path<String>,
	Json(payload): Json<RespondPayload>,
) -> Result<Json<RespondResponse>, HandlerError> {
	info!(
		donor_id,
		request_id = %payload.request_id,
		action = ?payload.action,
		"Donor response received over REST"
	);

	let signal = DonorSignal {
		donor_id,
		request_id: payload.request_id,
		action: payload.action,
	};
	let disposition = state
		.signal_router
		.handle(&signal)
		.await
		.map_err(storage_error)?;

	let (message, delivered, already_finalized) = match disposition {
		SignalDisposition::Delivered => ("Response recorded", true, false),
		SignalDisposition::AlreadyFinalized => ("Request already finalized", false, true),
		SignalDisposition::Discarded => ("No open offer for this response", false, false),
	};
	Ok(Json(RespondResponse {
		message: message.to_string(),
		delivered,
		already_finalized,
	}))
}
