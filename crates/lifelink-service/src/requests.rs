//! Request service
//!
//! Validates and creates donation requests, runs the matching synchronously
//! so the caller gets the ranked list back, then hands the cascade to its
//! own task.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use lifelink_storage::{HospitalStorage, PatientStorage, RequestStorage, Storage};
use lifelink_types::{CreateRequestPayload, DonationRequest, RequestValidationError};

use crate::coordinator::ResponseCoordinator;
use crate::dispatch::NotificationDispatcher;
use crate::lifecycle::CascadeEngine;
use crate::matcher::{MatchQuery, MatcherService};

#[derive(Debug, Error)]
pub enum RequestServiceError {
	#[error("validation error: {0}")]
	Validation(#[from] RequestValidationError),

	#[error("patient not found: {patient_id}")]
	PatientNotFound { patient_id: String },

	#[error("hospital not found: {hospital_id}")]
	HospitalNotFound { hospital_id: String },

	#[error("an active request already exists for patient {patient_id} and {target}")]
	DuplicateActive { patient_id: String, target: String },

	#[error("request not found: {request_id}")]
	NotFound { request_id: String },

	#[error("storage error: {0}")]
	Storage(String),
}

/// Service for creating and retrieving donation requests
pub struct RequestService {
	storage: Arc<dyn Storage>,
	matcher: Arc<MatcherService>,
	engine: Arc<CascadeEngine>,
	dispatcher: Arc<NotificationDispatcher>,
	coordinator: Arc<ResponseCoordinator>,
}

impl RequestService {
	pub fn new(
		storage: Arc<dyn Storage>,
		matcher: Arc<MatcherService>,
		engine: Arc<CascadeEngine>,
		dispatcher: Arc<NotificationDispatcher>,
		coordinator: Arc<ResponseCoordinator>,
	) -> Self {
		Self {
			storage,
			matcher,
			engine,
			dispatcher,
			coordinator,
		}
	}

	/// Validate, match, persist and return the created request, then start
	/// its cascade asynchronously.
	pub async fn submit_request(
		&self,
		payload: &CreateRequestPayload,
	) -> Result<DonationRequest, RequestServiceError> {
		payload.validate()?;

		let patient = self
			.storage
			.get_patient(&payload.patient_id)
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))?
			.ok_or_else(|| RequestServiceError::PatientNotFound {
				patient_id: payload.patient_id.clone(),
			})?;
		let hospital = self
			.storage
			.get_hospital(&payload.hospital_id)
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))?
			.ok_or_else(|| RequestServiceError::HospitalNotFound {
				hospital_id: payload.hospital_id.clone(),
			})?;

		let mut request = DonationRequest::new(
			payload.patient_id.clone(),
			payload.hospital_id.clone(),
			payload.organ.clone(),
			payload.urgency,
			payload.notes.clone(),
		);

		// One active request per patient and target
		let duplicate = self
			.storage
			.find_active_request(&payload.patient_id, request.target())
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))?;
		if duplicate.is_some() {
			return Err(RequestServiceError::DuplicateActive {
				patient_id: payload.patient_id.clone(),
				target: request.target().to_string(),
			});
		}

		// Matching runs synchronously so the response carries the ranking
		let ranked = self
			.matcher
			.rank_donors(&MatchQuery {
				organ: payload.organ.clone(),
				patient_age: patient.age,
				recipient_blood_group: patient.blood_group.clone(),
				hospital_city: hospital.city.clone(),
				urgency: payload.urgency,
			})
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))?;
		request.ranked_donors = ranked;

		self.storage
			.create_request(request.clone())
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))?;

		info!(
			request_id = %request.request_id,
			matches = request.ranked_donors.len(),
			target = request.target(),
			"Request created, starting cascade"
		);
		self.engine.spawn(request.request_id.clone());

		Ok(request)
	}

	/// Retrieve an existing request by id
	pub async fn get_request(
		&self,
		request_id: &str,
	) -> Result<Option<DonationRequest>, RequestServiceError> {
		self.storage
			.get_request(request_id)
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))
	}

	/// All requests raised by a hospital, newest first
	pub async fn get_requests_by_hospital(
		&self,
		hospital_id: &str,
	) -> Result<Vec<DonationRequest>, RequestServiceError> {
		self.storage
			.get_requests_by_hospital(hospital_id)
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))
	}

	/// Retract a request. Outstanding races resolve immediately; the owning
	/// hospital is told over its channel.
	pub async fn delete_request(&self, request_id: &str) -> Result<(), RequestServiceError> {
		let request = self
			.storage
			.get_request(request_id)
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))?
			.ok_or_else(|| RequestServiceError::NotFound {
				request_id: request_id.to_string(),
			})?;

		self.storage
			.remove_request(request_id)
			.await
			.map_err(|e| RequestServiceError::Storage(e.to_string()))?;
		self.coordinator.cancel_request(request_id);
		self.dispatcher
			.notify_request_deleted(&request.hospital_id, request_id);

		info!(request_id, "Request deleted");
		Ok(())
	}
}
