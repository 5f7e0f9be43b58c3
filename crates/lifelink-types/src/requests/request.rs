//! Request creation payload accepted by the submission endpoint

use serde::{Deserialize, Serialize};

use super::errors::RequestValidationError;
use super::{RequestValidationResult, Urgency};

/// Maximum accepted length for free-form notes
const MAX_NOTES_LEN: usize = 2_000;

/// Payload for creating a new organ or blood request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequestPayload {
	pub patient_id: String,
	pub hospital_id: String,

	/// Requested organ; omit for a blood request
	#[serde(default)]
	pub organ: Option<String>,

	pub urgency: Urgency,

	#[serde(default)]
	pub notes: Option<String>,
}

impl CreateRequestPayload {
	/// Validate the payload before any storage or matching work
	pub fn validate(&self) -> RequestValidationResult<()> {
		if self.patient_id.trim().is_empty() {
			return Err(RequestValidationError::MissingRequiredField {
				field: "patient_id".to_string(),
			});
		}
		if self.hospital_id.trim().is_empty() {
			return Err(RequestValidationError::MissingRequiredField {
				field: "hospital_id".to_string(),
			});
		}
		if let Some(organ) = &self.organ {
			if organ.trim().is_empty() {
				return Err(RequestValidationError::InvalidOrgan {
					organ: organ.clone(),
				});
			}
		}
		if let Some(notes) = &self.notes {
			if notes.len() > MAX_NOTES_LEN {
				return Err(RequestValidationError::NotesTooLong { max: MAX_NOTES_LEN });
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn payload() -> CreateRequestPayload {
		CreateRequestPayload {
			patient_id: "patient-1".to_string(),
			hospital_id: "hospital-1".to_string(),
			organ: Some("Kidney".to_string()),
			urgency: Urgency::High,
			notes: None,
		}
	}

	#[test]
	fn valid_payload_passes() {
		assert!(payload().validate().is_ok());
	}

	#[test]
	fn empty_patient_id_is_rejected() {
		let mut p = payload();
		p.patient_id = "  ".to_string();
		assert!(p.validate().is_err());
	}

	#[test]
	fn blank_organ_is_rejected() {
		let mut p = payload();
		p.organ = Some(String::new());
		assert!(p.validate().is_err());
	}

	#[test]
	fn missing_organ_means_blood_request() {
		let mut p = payload();
		p.organ = None;
		assert!(p.validate().is_ok());
	}
}
