//! In-memory storage implementation using DashMap
//!
//! The conditional mutations lean on DashMap's per-entry locking: a
//! `get_mut` guard holds the shard lock for the record, so check-then-write
//! sequences inside one guard are atomic per record.

use crate::traits::{
	DonorStorage, HospitalStorage, PatientStorage, RequestStorage, Storage, StorageResult,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use lifelink_types::storage::{StorageError, StorageStats};
use lifelink_types::{
	CurrentOffer, DonationRecord, DonationRequest, DonorResponse, FinalOutcome, Hospital,
	OutcomeEntry, Patient, PendingOffer, RequestStatus,
};
use lifelink_types::{Donor, DonatedOrgan};
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory storage for requests, donors, hospitals and patients
#[derive(Clone, Default)]
pub struct MemoryStore {
	pub requests: Arc<DashMap<String, DonationRequest>>,
	pub donors: Arc<DashMap<String, Donor>>,
	pub hospitals: Arc<DashMap<String, Hospital>>,
	pub patients: Arc<DashMap<String, Patient>>,
}

impl MemoryStore {
	/// Create a new memory store instance
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl RequestStorage for MemoryStore {
	async fn create_request(&self, request: DonationRequest) -> StorageResult<()> {
		let request_id = request.request_id.clone();
		if self.requests.contains_key(&request_id) {
			return Err(StorageError::Duplicate { id: request_id });
		}
		self.requests.insert(request_id, request);
		Ok(())
	}

	async fn get_request(&self, request_id: &str) -> StorageResult<Option<DonationRequest>> {
		Ok(self.requests.get(request_id).map(|r| r.clone()))
	}

	async fn remove_request(&self, request_id: &str) -> StorageResult<bool> {
		Ok(self.requests.remove(request_id).is_some())
	}

	async fn get_requests_by_hospital(
		&self,
		hospital_id: &str,
	) -> StorageResult<Vec<DonationRequest>> {
		let mut requests: Vec<DonationRequest> = self
			.requests
			.iter()
			.filter_map(|entry| {
				let request = entry.value();
				if request.hospital_id == hospital_id {
					Some(request.clone())
				} else {
					None
				}
			})
			.collect();
		requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(requests)
	}

	async fn find_active_request(
		&self,
		patient_id: &str,
		target: &str,
	) -> StorageResult<Option<DonationRequest>> {
		Ok(self
			.requests
			.iter()
			.find(|entry| {
				let request = entry.value();
				request.patient_id == patient_id
					&& request.target().eq_ignore_ascii_case(target)
					&& !request.finalized
			})
			.map(|entry| entry.value().clone()))
	}

	async fn get_unfinalized_requests(&self) -> StorageResult<Vec<DonationRequest>> {
		Ok(self
			.requests
			.iter()
			.filter_map(|entry| {
				let request = entry.value();
				if request.finalized {
					None
				} else {
					Some(request.clone())
				}
			})
			.collect())
	}

	async fn set_offer_index(&self, request_id: &str, index: usize) -> StorageResult<()> {
		let mut request =
			self.requests
				.get_mut(request_id)
				.ok_or_else(|| StorageError::NotFound {
					id: request_id.to_string(),
				})?;
		// The pointer only ever moves forward
		if index > request.offer_index {
			request.offer_index = index;
		}
		Ok(())
	}

	async fn append_response(
		&self,
		request_id: &str,
		response: DonorResponse,
	) -> StorageResult<bool> {
		let mut request =
			self.requests
				.get_mut(request_id)
				.ok_or_else(|| StorageError::NotFound {
					id: request_id.to_string(),
				})?;
		if request.finalized {
			debug!(
				request_id,
				donor_id = %response.donor_id,
				"Dropping response append on finalized request"
			);
			return Ok(false);
		}
		request.responses.push(response);
		Ok(true)
	}

	async fn is_finalized(&self, request_id: &str) -> StorageResult<bool> {
		let request = self
			.requests
			.get(request_id)
			.ok_or_else(|| StorageError::NotFound {
				id: request_id.to_string(),
			})?;
		Ok(request.finalized)
	}

	async fn finalize_request(
		&self,
		request_id: &str,
		outcome: FinalOutcome,
		response: Option<DonorResponse>,
	) -> StorageResult<bool> {
		let mut request =
			self.requests
				.get_mut(request_id)
				.ok_or_else(|| StorageError::NotFound {
					id: request_id.to_string(),
				})?;
		if request.finalized {
			return Ok(false);
		}
		request.finalized = true;
		match outcome {
			FinalOutcome::Accepted(donor) => {
				request.status = RequestStatus::Accepted;
				request.accepted_donor = Some(donor);
			},
			FinalOutcome::Exhausted => {
				request.status = RequestStatus::Exhausted;
			},
		}
		if let Some(response) = response {
			request.responses.push(response);
		}
		info!(request_id, status = ?request.status, "Request finalized");
		Ok(true)
	}

	async fn request_count(&self) -> StorageResult<usize> {
		Ok(self.requests.len())
	}
}

#[async_trait]
impl DonorStorage for MemoryStore {
	async fn create_donor(&self, donor: Donor) -> StorageResult<()> {
		let donor_id = donor.donor_id.clone();
		if self.donors.contains_key(&donor_id) {
			return Err(StorageError::Duplicate { id: donor_id });
		}
		self.donors.insert(donor_id, donor);
		Ok(())
	}

	async fn get_donor(&self, donor_id: &str) -> StorageResult<Option<Donor>> {
		Ok(self.donors.get(donor_id).map(|d| d.clone()))
	}

	async fn update_donor(&self, donor: Donor) -> StorageResult<()> {
		self.donors.insert(donor.donor_id.clone(), donor);
		Ok(())
	}

	async fn remove_donor(&self, donor_id: &str) -> StorageResult<bool> {
		Ok(self.donors.remove(donor_id).is_some())
	}

	async fn get_all_donors(&self) -> StorageResult<Vec<Donor>> {
		Ok(self.donors.iter().map(|entry| entry.value().clone()).collect())
	}

	async fn enqueue_offer(&self, donor_id: &str, offer: PendingOffer) -> StorageResult<bool> {
		let mut donor = self
			.donors
			.get_mut(donor_id)
			.ok_or_else(|| StorageError::NotFound {
				id: donor_id.to_string(),
			})?;
		if donor.has_pending_offer(&offer.request_id) {
			debug!(donor_id, request_id = %offer.request_id, "Offer already pending, skipping enqueue");
			return Ok(false);
		}
		donor.pending_offers.push(offer);
		Ok(true)
	}

	async fn drain_offers(&self, donor_id: &str) -> StorageResult<Vec<PendingOffer>> {
		let mut donor = self
			.donors
			.get_mut(donor_id)
			.ok_or_else(|| StorageError::NotFound {
				id: donor_id.to_string(),
			})?;
		Ok(std::mem::take(&mut donor.pending_offers))
	}

	async fn clear_offer(&self, donor_id: &str, request_id: &str) -> StorageResult<bool> {
		let mut donor = self
			.donors
			.get_mut(donor_id)
			.ok_or_else(|| StorageError::NotFound {
				id: donor_id.to_string(),
			})?;
		let before = donor.pending_offers.len();
		donor.pending_offers.retain(|o| o.request_id != request_id);
		Ok(donor.pending_offers.len() < before)
	}

	async fn try_reserve_donor(
		&self,
		donor_id: &str,
		offer: CurrentOffer,
	) -> StorageResult<bool> {
		let mut donor = self
			.donors
			.get_mut(donor_id)
			.ok_or_else(|| StorageError::NotFound {
				id: donor_id.to_string(),
			})?;
		match &donor.current_offer {
			Some(current) if current.request_id != offer.request_id => {
				debug!(
					donor_id,
					engaged_with = %current.request_id,
					requested_by = %offer.request_id,
					"Donor already engaged, reservation refused"
				);
				Ok(false)
			},
			_ => {
				donor.current_offer = Some(offer);
				Ok(true)
			},
		}
	}

	async fn release_donor(&self, donor_id: &str, request_id: &str) -> StorageResult<bool> {
		let mut donor = self
			.donors
			.get_mut(donor_id)
			.ok_or_else(|| StorageError::NotFound {
				id: donor_id.to_string(),
			})?;
		match &donor.current_offer {
			Some(current) if current.request_id == request_id => {
				donor.current_offer = None;
				Ok(true)
			},
			_ => Ok(false),
		}
	}

	async fn record_donation(&self, donor_id: &str, organ: Option<&str>) -> StorageResult<()> {
		let mut donor = self
			.donors
			.get_mut(donor_id)
			.ok_or_else(|| StorageError::NotFound {
				id: donor_id.to_string(),
			})?;
		match organ {
			Some(organ) => donor.donated_organs.push(DonatedOrgan {
				organ: organ.to_string(),
				donated_at: Utc::now(),
			}),
			None => donor.offers.blood.last_donation = Some(Utc::now()),
		}
		Ok(())
	}

	async fn donor_count(&self) -> StorageResult<usize> {
		Ok(self.donors.len())
	}
}

#[async_trait]
impl HospitalStorage for MemoryStore {
	async fn create_hospital(&self, hospital: Hospital) -> StorageResult<()> {
		let hospital_id = hospital.hospital_id.clone();
		if self.hospitals.contains_key(&hospital_id) {
			return Err(StorageError::Duplicate { id: hospital_id });
		}
		self.hospitals.insert(hospital_id, hospital);
		Ok(())
	}

	async fn get_hospital(&self, hospital_id: &str) -> StorageResult<Option<Hospital>> {
		Ok(self.hospitals.get(hospital_id).map(|h| h.clone()))
	}

	async fn append_outcome(&self, hospital_id: &str, entry: OutcomeEntry) -> StorageResult<()> {
		let mut hospital =
			self.hospitals
				.get_mut(hospital_id)
				.ok_or_else(|| StorageError::NotFound {
					id: hospital_id.to_string(),
				})?;
		hospital.outcome_log.push(entry.clone());
		hospital.pending_notifications.push(entry);
		Ok(())
	}

	async fn get_pending_notifications(
		&self,
		hospital_id: &str,
	) -> StorageResult<Vec<OutcomeEntry>> {
		let hospital = self
			.hospitals
			.get(hospital_id)
			.ok_or_else(|| StorageError::NotFound {
				id: hospital_id.to_string(),
			})?;
		Ok(hospital.pending_notifications.clone())
	}

	async fn acknowledge_notifications(
		&self,
		hospital_id: &str,
		request_id: Option<&str>,
	) -> StorageResult<usize> {
		let mut hospital =
			self.hospitals
				.get_mut(hospital_id)
				.ok_or_else(|| StorageError::NotFound {
					id: hospital_id.to_string(),
				})?;
		let before = hospital.pending_notifications.len();
		match request_id {
			Some(request_id) => hospital
				.pending_notifications
				.retain(|n| n.request_id != request_id),
			None => hospital.pending_notifications.clear(),
		}
		Ok(before - hospital.pending_notifications.len())
	}

	async fn append_donation_record(
		&self,
		hospital_id: &str,
		record: DonationRecord,
	) -> StorageResult<()> {
		let mut hospital =
			self.hospitals
				.get_mut(hospital_id)
				.ok_or_else(|| StorageError::NotFound {
					id: hospital_id.to_string(),
				})?;
		hospital.donation_history.push(record);
		Ok(())
	}

	async fn hospital_count(&self) -> StorageResult<usize> {
		Ok(self.hospitals.len())
	}
}

#[async_trait]
impl PatientStorage for MemoryStore {
	async fn create_patient(&self, patient: Patient) -> StorageResult<()> {
		let patient_id = patient.patient_id.clone();
		if self.patients.contains_key(&patient_id) {
			return Err(StorageError::Duplicate { id: patient_id });
		}
		self.patients.insert(patient_id, patient);
		Ok(())
	}

	async fn get_patient(&self, patient_id: &str) -> StorageResult<Option<Patient>> {
		Ok(self.patients.get(patient_id).map(|p| p.clone()))
	}

	async fn patient_count(&self) -> StorageResult<usize> {
		Ok(self.patients.len())
	}
}

#[async_trait]
impl Storage for MemoryStore {
	async fn health_check(&self) -> StorageResult<bool> {
		// For in-memory storage, just check that the maps are accessible
		Ok(true)
	}

	async fn stats(&self) -> StorageResult<StorageStats> {
		let total_requests = self.requests.len();
		let active_requests = self
			.requests
			.iter()
			.filter(|entry| !entry.value().finalized)
			.count();

		Ok(StorageStats {
			total_requests,
			active_requests,
			total_donors: self.donors.len(),
			total_hospitals: self.hospitals.len(),
		})
	}

	async fn close(&self) -> StorageResult<()> {
		// For memory store, there's nothing to close
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use lifelink_types::{
		AcceptedDonor, BloodDonation, DonationOffers, MedicalDetails, PersonalDetails,
		ResponseOutcome, Urgency,
	};

	fn store() -> MemoryStore {
		MemoryStore::new()
	}

	fn request() -> DonationRequest {
		DonationRequest::new(
			"patient-1".to_string(),
			"hospital-1".to_string(),
			Some("Kidney".to_string()),
			Urgency::High,
			None,
		)
	}

	fn donor(donor_id: &str) -> Donor {
		Donor {
			donor_id: donor_id.to_string(),
			personal: PersonalDetails {
				first_name: "Asha".to_string(),
				last_name: "Rao".to_string(),
				age: 30,
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
				living_organs: vec!["Kidney".to_string()],
				posthumous_organs: vec![],
			},
			donated_organs: vec![],
			consent: true,
			pending_offers: vec![],
			current_offer: None,
		}
	}

	fn current_offer(request_id: &str) -> CurrentOffer {
		CurrentOffer {
			request_id: request_id.to_string(),
			target: "Kidney".to_string(),
			urgency: Urgency::High,
			offered_at: Utc::now(),
		}
	}

	fn response(donor_id: &str, outcome: ResponseOutcome) -> DonorResponse {
		DonorResponse {
			donor_id: donor_id.to_string(),
			outcome,
			offered_at: Utc::now(),
			responded_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn finalize_is_a_one_shot_cas() {
		let store = store();
		let request = request();
		let request_id = request.request_id.clone();
		store.create_request(request).await.unwrap();

		let accepted = AcceptedDonor {
			donor_id: "d1".to_string(),
			name: "Asha Rao".to_string(),
			phone: "555-0101".to_string(),
			city: "Pune".to_string(),
		};
		let first = store
			.finalize_request(
				&request_id,
				FinalOutcome::Accepted(accepted.clone()),
				Some(response("d1", ResponseOutcome::Accepted)),
			)
			.await
			.unwrap();
		assert!(first);

		// The losing path must not overwrite the outcome
		let second = store
			.finalize_request(&request_id, FinalOutcome::Exhausted, None)
			.await
			.unwrap();
		assert!(!second);

		let stored = store.get_request(&request_id).await.unwrap().unwrap();
		assert!(stored.finalized);
		assert_eq!(stored.status, RequestStatus::Accepted);
		assert_eq!(stored.accepted_donor, Some(accepted));
		assert_eq!(stored.responses.len(), 1);
	}

	#[tokio::test]
	async fn append_response_is_refused_after_finalize() {
		let store = store();
		let request = request();
		let request_id = request.request_id.clone();
		store.create_request(request).await.unwrap();

		store
			.finalize_request(&request_id, FinalOutcome::Exhausted, None)
			.await
			.unwrap();

		let appended = store
			.append_response(&request_id, response("d2", ResponseOutcome::Declined))
			.await
			.unwrap();
		assert!(!appended);
		let stored = store.get_request(&request_id).await.unwrap().unwrap();
		assert!(stored.responses.is_empty());
	}

	#[tokio::test]
	async fn offer_index_never_decreases() {
		let store = store();
		let request = request();
		let request_id = request.request_id.clone();
		store.create_request(request).await.unwrap();

		store.set_offer_index(&request_id, 2).await.unwrap();
		store.set_offer_index(&request_id, 1).await.unwrap();
		let stored = store.get_request(&request_id).await.unwrap().unwrap();
		assert_eq!(stored.offer_index, 2);
	}

	#[tokio::test]
	async fn donor_reservation_excludes_other_requests() {
		let store = store();
		store.create_donor(donor("d1")).await.unwrap();

		assert!(store
			.try_reserve_donor("d1", current_offer("r1"))
			.await
			.unwrap());
		// Same request may re-reserve
		assert!(store
			.try_reserve_donor("d1", current_offer("r1"))
			.await
			.unwrap());
		// A different request may not
		assert!(!store
			.try_reserve_donor("d1", current_offer("r2"))
			.await
			.unwrap());

		assert!(store.release_donor("d1", "r1").await.unwrap());
		assert!(store
			.try_reserve_donor("d1", current_offer("r2"))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn enqueue_offer_dedupes_by_request() {
		let store = store();
		store.create_donor(donor("d1")).await.unwrap();

		let offer = PendingOffer {
			request_id: "r1".to_string(),
			target: "Kidney".to_string(),
			urgency: Urgency::High,
			hospital_name: "City Hospital".to_string(),
			hospital_city: "Pune".to_string(),
			created_at: Utc::now(),
		};
		assert!(store.enqueue_offer("d1", offer.clone()).await.unwrap());
		assert!(!store.enqueue_offer("d1", offer).await.unwrap());

		let drained = store.drain_offers("d1").await.unwrap();
		assert_eq!(drained.len(), 1);
		// Second drain is empty: no duplicate deliveries on reconnect
		assert!(store.drain_offers("d1").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn acknowledge_clears_pending_but_not_the_log() {
		let store = store();
		store
			.create_hospital(Hospital::new(
				"h1".to_string(),
				"City Hospital".to_string(),
				"Pune".to_string(),
			))
			.await
			.unwrap();

		let entry = OutcomeEntry {
			donor: None,
			request_id: "r1".to_string(),
			target: "Kidney".to_string(),
			urgency: Urgency::High,
			outcome: lifelink_types::CascadeOutcome::Exhausted,
			created_at: Utc::now(),
		};
		store.append_outcome("h1", entry).await.unwrap();

		let cleared = store
			.acknowledge_notifications("h1", Some("r1"))
			.await
			.unwrap();
		assert_eq!(cleared, 1);

		let hospital = store.get_hospital("h1").await.unwrap().unwrap();
		assert!(hospital.pending_notifications.is_empty());
		assert_eq!(hospital.outcome_log.len(), 1);
	}
}
