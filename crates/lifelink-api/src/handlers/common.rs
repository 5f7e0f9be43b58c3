use serde::Serialize;

/// Error response format shared by handlers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	pub timestamp: i64,
}

impl ErrorResponse {
	pub fn new(error: &str, message: String) -> Self {
		Self {
			error: error.to_string(),
			message,
			timestamp: chrono::Utc::now().timestamp(),
		}
	}
}
