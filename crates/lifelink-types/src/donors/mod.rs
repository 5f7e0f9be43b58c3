//! Donor domain model
//!
//! Only the subset of donor data the matching core reads and writes:
//! eligibility attributes, the durable pending-offer queue and the
//! per-donor current-offer reservation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod errors;

pub use errors::DonorError;

use crate::requests::Urgency;

/// Result type for donor operations
pub type DonorResult<T> = Result<T, DonorError>;

/// Personal details relevant to matching and hospital notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonalDetails {
	pub first_name: String,
	pub last_name: String,
	pub age: u32,
	pub phone: String,
	pub city: String,
}

/// Medical details relevant to matching
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MedicalDetails {
	pub blood_group: Option<String>,
}

/// Blood donation consent and history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BloodDonation {
	pub agreed: bool,
	pub last_donation: Option<DateTime<Utc>>,
}

/// What the donor has offered to donate
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DonationOffers {
	pub blood: BloodDonation,
	pub living_organs: Vec<String>,
	pub posthumous_organs: Vec<String>,
}

/// A completed organ donation; blocks re-offering the same organ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonatedOrgan {
	pub organ: String,
	pub donated_at: DateTime<Utc>,
}

/// Durable offer waiting for delivery to a (possibly offline) donor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingOffer {
	pub request_id: String,
	pub target: String,
	pub urgency: Urgency,
	pub hospital_name: String,
	pub hospital_city: String,
	pub created_at: DateTime<Utc>,
}

/// The one request this donor is currently engaged with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentOffer {
	pub request_id: String,
	pub target: String,
	pub urgency: Urgency,
	pub offered_at: DateTime<Utc>,
}

/// Core donor domain model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donor {
	pub donor_id: String,
	pub personal: PersonalDetails,
	pub medical: MedicalDetails,
	pub offers: DonationOffers,
	#[serde(default)]
	pub donated_organs: Vec<DonatedOrgan>,
	pub consent: bool,

	/// Offers not yet delivered; drained and cleared on (re)connect
	#[serde(default)]
	pub pending_offers: Vec<PendingOffer>,

	/// At most one outstanding offer across all requests
	#[serde(default)]
	pub current_offer: Option<CurrentOffer>,
}

impl Donor {
	pub fn full_name(&self) -> String {
		format!("{} {}", self.personal.first_name, self.personal.last_name)
	}

	/// Whether the donor lists the organ among living-organ offers
	pub fn offers_organ(&self, organ: &str) -> bool {
		self.offers
			.living_organs
			.iter()
			.any(|o| o.eq_ignore_ascii_case(organ))
	}

	/// Whether the donor has already donated the organ
	pub fn has_donated(&self, organ: &str) -> bool {
		self.donated_organs
			.iter()
			.any(|d| d.organ.eq_ignore_ascii_case(organ))
	}

	/// Whether the donor currently holds an outstanding offer
	pub fn is_engaged(&self) -> bool {
		self.current_offer.is_some()
	}

	/// Whether an offer for the given request is already queued
	pub fn has_pending_offer(&self, request_id: &str) -> bool {
		self.pending_offers.iter().any(|o| o.request_id == request_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn donor() -> Donor {
		Donor {
			donor_id: "donor-1".to_string(),
			personal: PersonalDetails {
				first_name: "Asha".to_string(),
				last_name: "Rao".to_string(),
				age: 34,
				phone: "555-0101".to_string(),
				city: "Pune".to_string(),
			},
			medical: MedicalDetails {
				blood_group: Some("O+".to_string()),
			},
			offers: DonationOffers {
				blood: BloodDonation::default(),
				living_organs: vec!["Kidney".to_string(), "Liver".to_string()],
				posthumous_organs: vec![],
			},
			donated_organs: vec![],
			consent: true,
			pending_offers: vec![],
			current_offer: None,
		}
	}

	#[test]
	fn organ_offers_match_case_insensitively() {
		let donor = donor();
		assert!(donor.offers_organ("kidney"));
		assert!(donor.offers_organ("KIDNEY"));
		assert!(!donor.offers_organ("Heart"));
	}

	#[test]
	fn donated_organ_is_detected() {
		let mut donor = donor();
		donor.donated_organs.push(DonatedOrgan {
			organ: "Kidney".to_string(),
			donated_at: Utc::now(),
		});
		assert!(donor.has_donated("kidney"));
		assert!(!donor.has_donated("Liver"));
	}
}
