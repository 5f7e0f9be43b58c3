//! API response shapes for donation requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DonationRequest, RankedDonor, RequestStatus, Urgency};

/// Ranked candidate as exposed to API consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDonorResponse {
	pub donor_id: String,
	pub name: String,
	pub age: u32,
	pub city: String,
	pub score: f64,
}

impl From<&RankedDonor> for RankedDonorResponse {
	fn from(donor: &RankedDonor) -> Self {
		Self {
			donor_id: donor.donor_id.clone(),
			name: donor.name.clone(),
			age: donor.age,
			city: donor.city.clone(),
			score: donor.score,
		}
	}
}

/// Donation request as exposed to API consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResponse {
	pub request_id: String,
	pub patient_id: String,
	pub hospital_id: String,
	pub target: String,
	pub urgency: Urgency,
	pub status: RequestStatus,
	pub finalized: bool,
	pub matches: Vec<RankedDonorResponse>,
	pub created_at: DateTime<Utc>,
}

impl From<&DonationRequest> for RequestResponse {
	fn from(request: &DonationRequest) -> Self {
		Self {
			request_id: request.request_id.clone(),
			patient_id: request.patient_id.clone(),
			hospital_id: request.hospital_id.clone(),
			target: request.target().to_string(),
			urgency: request.urgency,
			status: request.status,
			finalized: request.finalized,
			matches: request.ranked_donors.iter().map(Into::into).collect(),
			created_at: request.created_at,
		}
	}
}
