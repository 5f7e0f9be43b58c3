//! Error types for donor operations

use thiserror::Error;

/// General donor-related errors
#[derive(Error, Debug)]
pub enum DonorError {
	#[error("Donor not found: {donor_id}")]
	NotFound { donor_id: String },

	#[error("Donor {donor_id} is engaged with request {request_id}")]
	Engaged { donor_id: String, request_id: String },

	#[error("Storage error: {0}")]
	Storage(String),
}
