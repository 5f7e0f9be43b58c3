//! Error types for predictor calls

use thiserror::Error;

/// Errors from a single predictor call
///
/// All of these are contained per donor by the matcher; none abort a batch.
#[derive(Error, Debug)]
pub enum PredictorError {
	#[error("Predictor request failed: {message}")]
	Http { message: String },

	#[error("Predictor call timed out after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Predictor returned an invalid response: {reason}")]
	InvalidResponse { reason: String },

	#[error("Predictor returned probability {probability} outside [0, 1]")]
	ProbabilityOutOfRange { probability: f64 },

	#[error("Invalid predictor endpoint: {message}")]
	Endpoint { message: String },
}
