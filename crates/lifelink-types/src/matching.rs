//! Feature vector and prediction shapes for the external predictor

use serde::{Deserialize, Serialize};

use crate::donors::Donor;
use crate::requests::Urgency;

/// Fixed feature vector sent to the predictor, one per eligible donor
///
/// Field names are the predictor's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
	/// Always 1: the eligibility filter already enforced an exact match
	pub blood_match: u8,
	pub organ_match: u8,
	pub age_diff: u32,
	pub urgency: u8,
	pub city_match: u8,
	pub consent: u8,
}

impl FeatureVector {
	/// Build the feature vector for one donor against the request's patient
	pub fn build(
		donor: &Donor,
		patient_age: u32,
		organ: Option<&str>,
		urgency: Urgency,
		hospital_city: &str,
	) -> Self {
		let organ_match = match organ {
			Some(organ) if donor.offers_organ(organ) => 1,
			_ => 0,
		};
		let city_match = if donor.personal.city.eq_ignore_ascii_case(hospital_city) {
			1
		} else {
			0
		};
		Self {
			blood_match: 1,
			organ_match,
			age_diff: donor.personal.age.abs_diff(patient_age),
			urgency: urgency.weight(),
			city_match,
			consent: u8::from(donor.consent),
		}
	}
}

/// Predictor response: match probability in [0, 1] plus the thresholded class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
	pub prediction: u8,
	pub probability: f64,
}
