//! Error types for request operations

use thiserror::Error;

/// Validation errors for request creation payloads
#[derive(Error, Debug)]
pub enum RequestValidationError {
	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("Invalid organ name: {organ}")]
	InvalidOrgan { organ: String },

	#[error("Notes exceed maximum length of {max} characters")]
	NotesTooLong { max: usize },
}

/// General request-related errors
#[derive(Error, Debug)]
pub enum RequestError {
	#[error("Request validation failed: {0}")]
	Validation(#[from] RequestValidationError),

	#[error("Request not found: {request_id}")]
	NotFound { request_id: String },

	#[error("Request {request_id} is already finalized")]
	AlreadyFinalized { request_id: String },

	#[error("An active request already exists for patient {patient_id} and {target}")]
	DuplicateActive { patient_id: String, target: String },

	#[error("Storage error: {0}")]
	Storage(String),
}
