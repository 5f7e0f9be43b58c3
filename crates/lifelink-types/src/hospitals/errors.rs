//! Error types for hospital operations

use thiserror::Error;

/// General hospital-related errors
#[derive(Error, Debug)]
pub enum HospitalError {
	#[error("Hospital not found: {hospital_id}")]
	NotFound { hospital_id: String },

	#[error("Storage error: {0}")]
	Storage(String),
}
