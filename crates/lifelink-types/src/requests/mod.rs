//! Core donation request domain model and business logic

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod errors;
pub mod request;
pub mod response;

pub use errors::{RequestError, RequestValidationError};
pub use request::CreateRequestPayload;
pub use response::{RankedDonorResponse, RequestResponse};

/// Result types for request operations
pub type RequestResult<T> = Result<T, RequestError>;
pub type RequestValidationResult<T> = Result<T, RequestValidationError>;

/// Request urgency, ordered `High > Medium > Low`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
	#[serde(alias = "High")]
	High,
	#[serde(alias = "Medium")]
	Medium,
	#[serde(alias = "Low")]
	Low,
}

impl Urgency {
	/// Weight used in the predictor feature vector
	pub fn weight(&self) -> u8 {
		match self {
			Urgency::High => 3,
			Urgency::Medium => 2,
			Urgency::Low => 1,
		}
	}
}

/// Request lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
	/// Cascade has not reached a terminal outcome yet
	Pending,
	/// A donor accepted and confirmed
	Accepted,
	/// Every ranked candidate declined, timed out or was skipped
	Exhausted,
}

/// Outcome of a single offer to a single donor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseOutcome {
	/// Donor accepted and confirmed
	Accepted,
	/// Donor declined the offer
	Declined,
	/// Offer deadline elapsed without a response
	TimedOut,
	/// Donor accepted but cancelled (or ignored) the confirmation handshake
	Cancelled,
	/// Donor was engaged by another request when the offer came up
	Skipped,
}

/// A scored candidate in the frozen ranked list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedDonor {
	pub donor_id: String,
	pub name: String,
	pub age: u32,
	pub city: String,
	pub blood_group: String,
	/// Predictor probability at ranking time
	pub score: f64,
}

/// Append-only response log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonorResponse {
	pub donor_id: String,
	pub outcome: ResponseOutcome,
	pub offered_at: DateTime<Utc>,
	pub responded_at: DateTime<Utc>,
}

/// Contact snapshot of the donor that accepted the request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceptedDonor {
	pub donor_id: String,
	pub name: String,
	pub phone: String,
	pub city: String,
}

/// Terminal outcome recorded by the finalize transition
#[derive(Debug, Clone, PartialEq)]
pub enum FinalOutcome {
	Accepted(AcceptedDonor),
	Exhausted,
}

/// Core donation request domain model
///
/// Created once by the hospital submission endpoint, mutated only by the
/// owning cascade task through storage, immutable once `finalized`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonationRequest {
	pub request_id: String,
	pub patient_id: String,
	pub hospital_id: String,

	/// Requested organ; `None` means a blood request
	pub organ: Option<String>,
	pub urgency: Urgency,
	pub notes: Option<String>,

	/// Ranked candidate list, frozen at creation and never re-ordered
	pub ranked_donors: Vec<RankedDonor>,

	/// Index of the candidate currently or most recently offered.
	/// Monotonically non-decreasing.
	pub offer_index: usize,

	/// Append-only log of per-donor outcomes
	pub responses: Vec<DonorResponse>,

	pub status: RequestStatus,

	/// Once set, never unset; guards every subsequent mutation
	pub finalized: bool,

	pub accepted_donor: Option<AcceptedDonor>,

	pub created_at: DateTime<Utc>,
}

impl DonationRequest {
	pub fn new(
		patient_id: String,
		hospital_id: String,
		organ: Option<String>,
		urgency: Urgency,
		notes: Option<String>,
	) -> Self {
		Self {
			request_id: Uuid::new_v4().to_string(),
			patient_id,
			hospital_id,
			organ,
			urgency,
			notes,
			ranked_donors: Vec::new(),
			offer_index: 0,
			responses: Vec::new(),
			status: RequestStatus::Pending,
			finalized: false,
			accepted_donor: None,
			created_at: Utc::now(),
		}
	}

	/// Whether this is a blood request rather than an organ request
	pub fn is_blood(&self) -> bool {
		self.organ.is_none()
	}

	/// Display label of the requested target ("Blood" or the organ name)
	pub fn target(&self) -> &str {
		self.organ.as_deref().unwrap_or("Blood")
	}

	/// Whether an outcome has already been logged for the given donor
	pub fn has_response_for(&self, donor_id: &str) -> bool {
		self.responses.iter().any(|r| r.donor_id == donor_id)
	}

	/// The single accepted response entry, if any
	pub fn accepted_response(&self) -> Option<&DonorResponse> {
		self.responses
			.iter()
			.find(|r| r.outcome == ResponseOutcome::Accepted)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request_with(organ: Option<&str>) -> DonationRequest {
		DonationRequest::new(
			"patient-1".to_string(),
			"hospital-1".to_string(),
			organ.map(str::to_string),
			Urgency::High,
			None,
		)
	}

	#[test]
	fn blood_request_has_blood_target() {
		let request = request_with(None);
		assert!(request.is_blood());
		assert_eq!(request.target(), "Blood");
	}

	#[test]
	fn organ_request_targets_the_organ() {
		let request = request_with(Some("Kidney"));
		assert!(!request.is_blood());
		assert_eq!(request.target(), "Kidney");
	}

	#[test]
	fn urgency_orders_high_before_low() {
		assert!(Urgency::High < Urgency::Medium);
		assert!(Urgency::Medium < Urgency::Low);
		assert_eq!(Urgency::High.weight(), 3);
		assert_eq!(Urgency::Low.weight(), 1);
	}

	#[test]
	fn new_request_starts_pending_and_unfinalized() {
		let request = request_with(Some("Liver"));
		assert_eq!(request.status, RequestStatus::Pending);
		assert!(!request.finalized);
		assert_eq!(request.offer_index, 0);
		assert!(request.responses.is_empty());
	}
}
