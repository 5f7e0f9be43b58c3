//! Mock predictor and entity fixtures for tests and downstream users

use async_trait::async_trait;

use lifelink_types::matching::{FeatureVector, Prediction};
use lifelink_types::{
	BloodDonation, DonationOffers, Donor, Hospital, MatchPredictor, MedicalDetails, Patient,
	PersonalDetails, PredictorError, PredictorResult,
};

/// Predictor returning a fixed probability, or failing on demand
#[derive(Debug)]
pub struct MockPredictor {
	probability: f64,
	fail: bool,
}

impl MockPredictor {
	/// A predictor that scores every donor with the given probability
	pub fn scoring(probability: f64) -> Self {
		Self {
			probability,
			fail: false,
		}
	}

	/// A predictor whose every call fails
	pub fn failing() -> Self {
		Self {
			probability: 0.0,
			fail: true,
		}
	}
}

#[async_trait]
impl MatchPredictor for MockPredictor {
	fn name(&self) -> &str {
		"mock-predictor"
	}

	async fn predict(&self, _features: &FeatureVector) -> PredictorResult<Prediction> {
		if self.fail {
			return Err(PredictorError::Http {
				message: "mock predictor failure".to_string(),
			});
		}
		Ok(Prediction {
			prediction: u8::from(self.probability > 0.5),
			probability: self.probability,
		})
	}

	async fn health_check(&self) -> PredictorResult<bool> {
		Ok(!self.fail)
	}
}

/// A consenting kidney donor fixture
pub fn mock_donor(donor_id: &str, age: u32) -> Donor {
	Donor {
		donor_id: donor_id.to_string(),
		personal: PersonalDetails {
			first_name: "Asha".to_string(),
			last_name: donor_id.to_string(),
			age,
			phone: "555-0101".to_string(),
			city: "Pune".to_string(),
		},
		medical: MedicalDetails {
			blood_group: Some("O+".to_string()),
		},
		offers: DonationOffers {
			blood: BloodDonation {
				agreed: true,
				last_donation: None,
			},
			living_organs: vec!["Kidney".to_string(), "Liver".to_string()],
			posthumous_organs: vec![],
		},
		donated_organs: vec![],
		consent: true,
		pending_offers: vec![],
		current_offer: None,
	}
}

/// A hospital fixture in the same city as the mock donors
pub fn mock_hospital(hospital_id: &str) -> Hospital {
	Hospital::new(
		hospital_id.to_string(),
		"City Care Hospital".to_string(),
		"Pune".to_string(),
	)
}

/// A patient fixture compatible with the mock donors
pub fn mock_patient(patient_id: &str, age: u32) -> Patient {
	Patient {
		patient_id: patient_id.to_string(),
		name: "Meera Joshi".to_string(),
		age,
		blood_group: Some("O+".to_string()),
		email: None,
		phone: None,
	}
}
