//! Hospital domain model
//!
//! Hospitals own the durable outcome log: one entry per completed offer plus
//! a final exhaustion notice. The log is append-only from the core's
//! perspective; entries leave `pending_notifications` only on explicit
//! acknowledgment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod errors;

pub use errors::HospitalError;

use crate::requests::{ResponseOutcome, Urgency};

/// Result type for hospital operations
pub type HospitalResult<T> = Result<T, HospitalError>;

/// Outcome recorded against a hospital, per candidate or per cascade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CascadeOutcome {
	Accepted,
	Declined,
	TimedOut,
	Cancelled,
	Skipped,
	/// Every ranked candidate has been tried without an acceptance
	Exhausted,
}

impl From<ResponseOutcome> for CascadeOutcome {
	fn from(outcome: ResponseOutcome) -> Self {
		match outcome {
			ResponseOutcome::Accepted => Self::Accepted,
			ResponseOutcome::Declined => Self::Declined,
			ResponseOutcome::TimedOut => Self::TimedOut,
			ResponseOutcome::Cancelled => Self::Cancelled,
			ResponseOutcome::Skipped => Self::Skipped,
		}
	}
}

/// Donor contact snapshot carried on outcome entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonorSummary {
	pub donor_id: String,
	pub name: String,
	pub city: String,
	pub age: u32,
	pub phone: String,
}

/// One entry in the hospital outcome log
///
/// `donor` is `None` for the exhaustion notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeEntry {
	pub donor: Option<DonorSummary>,
	pub request_id: String,
	pub target: String,
	pub urgency: Urgency,
	pub outcome: CascadeOutcome,
	pub created_at: DateTime<Utc>,
}

/// A completed donation, kept for the hospital's records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonationRecord {
	pub donor_id: String,
	pub donor_name: String,
	pub target: String,
	pub patient_id: String,
	pub patient_name: String,
	pub donated_at: DateTime<Utc>,
}

/// Core hospital domain model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hospital {
	pub hospital_id: String,
	pub name: String,
	pub city: String,

	/// Full history of outcomes, never cleared by the core
	#[serde(default)]
	pub outcome_log: Vec<OutcomeEntry>,

	/// Unacknowledged outcomes, replayed on reconnect
	#[serde(default)]
	pub pending_notifications: Vec<OutcomeEntry>,

	#[serde(default)]
	pub donation_history: Vec<DonationRecord>,
}

impl Hospital {
	pub fn new(hospital_id: String, name: String, city: String) -> Self {
		Self {
			hospital_id,
			name,
			city,
			outcome_log: Vec::new(),
			pending_notifications: Vec::new(),
			donation_history: Vec::new(),
		}
	}
}
