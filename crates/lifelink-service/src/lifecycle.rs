//! Request lifecycle controller
//!
//! One long-lived task per request walks the frozen ranked list in order:
//! `Offering(i)` races accept/decline against the offer deadline,
//! `Confirming(i)` races the confirmation handshake against its shorter
//! deadline, and the one-time finalize transition settles the terminal
//! outcome. The `finalized` flag is re-read before every transition; a task
//! that finds it set abandons its own transition silently.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use lifelink_storage::{
	DonorStorage, HospitalStorage, PatientStorage, RequestStorage, Storage,
};
use lifelink_types::constants::limits::{CONFIRM_TIMEOUT_SECS, DEFAULT_OFFER_TIMEOUT_SECS};
use lifelink_types::storage::StorageError;
use lifelink_types::{
	AcceptedDonor, CascadeOutcome, CurrentOffer, DonationRecord, DonationRequest, Donor,
	DonorResponse, DonorSummary, FinalOutcome, Hospital, OutcomeEntry, ResponseOutcome,
};

use crate::coordinator::{ConfirmAnswer, ConfirmWait, OfferAnswer, OfferWait, ResponseCoordinator};
use crate::dispatch::NotificationDispatcher;

/// Cascade deadlines
#[derive(Debug, Clone)]
pub struct CascadeConfig {
	/// How long a donor has to answer an offer
	pub offer_timeout: Duration,
	/// How long the accepting donor has to confirm
	pub confirm_timeout: Duration,
}

impl Default for CascadeConfig {
	fn default() -> Self {
		Self {
			offer_timeout: Duration::from_secs(DEFAULT_OFFER_TIMEOUT_SECS),
			confirm_timeout: Duration::from_secs(CONFIRM_TIMEOUT_SECS),
		}
	}
}

/// Errors that abort a cascade
///
/// Anything here leaves the request non-finalized for the recovery sweep;
/// per-offer failures are handled inside the loop and never surface.
#[derive(Debug, Error)]
pub enum CascadeError {
	#[error("Request not found: {request_id}")]
	RequestMissing { request_id: String },

	#[error("Donor record missing mid-cascade: {donor_id}")]
	DonorMissing { donor_id: String },

	#[error("Hospital not found: {hospital_id}")]
	HospitalMissing { hospital_id: String },

	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// How one offer step ended
enum OfferStep {
	/// The request reached a terminal state; stop the loop
	Finalized,
	/// A non-accepting outcome was recorded; advance to the next candidate
	Recorded(ResponseOutcome),
}

/// Owns the cascade loop for every request
pub struct CascadeEngine {
	storage: Arc<dyn Storage>,
	dispatcher: Arc<NotificationDispatcher>,
	coordinator: Arc<ResponseCoordinator>,
	config: CascadeConfig,
}

impl CascadeEngine {
	pub fn new(
		storage: Arc<dyn Storage>,
		dispatcher: Arc<NotificationDispatcher>,
		coordinator: Arc<ResponseCoordinator>,
		config: CascadeConfig,
	) -> Self {
		Self {
			storage,
			dispatcher,
			coordinator,
			config,
		}
	}

	/// Run the cascade as an independent task
	pub fn spawn(self: &Arc<Self>, request_id: String) -> JoinHandle<()> {
		let engine = Arc::clone(self);
		tokio::spawn(async move {
			match engine.run(&request_id).await {
				Ok(()) => {},
				Err(
					CascadeError::RequestMissing { .. }
					| CascadeError::Storage(StorageError::NotFound { .. }),
				) => {
					warn!(request_id, "Request disappeared mid-cascade, stopping");
				},
				Err(e) => {
					// Left non-finalized for the recovery sweep
					error!(request_id, error = %e, "Cascade aborted");
				},
			}
		})
	}

	/// Walk the ranked list from the first untried candidate to a terminal
	/// outcome. Safe to call again after a restart: already-recorded
	/// candidates are skipped.
	pub async fn run(&self, request_id: &str) -> Result<(), CascadeError> {
		let request = self
			.storage
			.get_request(request_id)
			.await?
			.ok_or_else(|| CascadeError::RequestMissing {
				request_id: request_id.to_string(),
			})?;
		if request.finalized {
			return Ok(());
		}

		let hospital = self
			.storage
			.get_hospital(&request.hospital_id)
			.await?
			.ok_or_else(|| CascadeError::HospitalMissing {
				hospital_id: request.hospital_id.clone(),
			})?;
		// Patient data is collaborator-owned; fall back to the id for records
		let patient_name = self
			.storage
			.get_patient(&request.patient_id)
			.await?
			.map(|p| p.name)
			.unwrap_or_else(|| request.patient_id.clone());

		if request.ranked_donors.is_empty() {
			info!(request_id, "No ranked donors, finalizing as exhausted");
			return self.finalize_exhausted(&request, &hospital).await;
		}

		let start = request
			.ranked_donors
			.iter()
			.position(|c| !request.has_response_for(&c.donor_id))
			.unwrap_or(request.ranked_donors.len());

		for index in start..request.ranked_donors.len() {
			// Another path may have settled the request while we waited
			if self.storage.is_finalized(request_id).await? {
				debug!(request_id, "Request finalized elsewhere, abandoning loop");
				return Ok(());
			}

			self.storage.set_offer_index(request_id, index).await?;
			let step = self
				.offer_candidate(&request, index, &hospital, &patient_name)
				.await?;
			match step {
				OfferStep::Finalized => return Ok(()),
				OfferStep::Recorded(outcome) => {
					debug!(
						request_id,
						index,
						?outcome,
						"Candidate settled, advancing"
					);
				},
			}
		}

		self.finalize_exhausted(&request, &hospital).await
	}

	/// `Offering(index)` and, on acceptance, `Confirming(index)`
	async fn offer_candidate(
		&self,
		request: &DonationRequest,
		index: usize,
		hospital: &Hospital,
		patient_name: &str,
	) -> Result<OfferStep, CascadeError> {
		let candidate = &request.ranked_donors[index];
		let offered_at = Utc::now();

		let donor = self
			.storage
			.get_donor(&candidate.donor_id)
			.await?
			.ok_or_else(|| CascadeError::DonorMissing {
				donor_id: candidate.donor_id.clone(),
			})?;

		// Per-donor exclusion: never offer to a donor engaged elsewhere
		let reserved = self
			.storage
			.try_reserve_donor(
				&donor.donor_id,
				CurrentOffer {
					request_id: request.request_id.clone(),
					target: request.target().to_string(),
					urgency: request.urgency,
					offered_at,
				},
			)
			.await?;
		if !reserved {
			info!(
				request_id = %request.request_id,
				donor_id = %donor.donor_id,
				"Donor engaged with another request, skipping"
			);
			return self
				.record_outcome(request, &donor, hospital, ResponseOutcome::Skipped, offered_at)
				.await;
		}

		self.dispatcher.send_offer(&donor, request, hospital).await?;
		info!(
			request_id = %request.request_id,
			donor_id = %donor.donor_id,
			index,
			"Offer dispatched, waiting for response"
		);

		let outcome = match self
			.coordinator
			.wait_offer(&request.request_id, &donor.donor_id, self.config.offer_timeout)
			.await
		{
			OfferWait::Answered(OfferAnswer::Accepted) => {
				self.dispatcher
					.request_confirmation(&donor.donor_id, &request.request_id);
				match self
					.coordinator
					.wait_confirmation(
						&request.request_id,
						&donor.donor_id,
						self.config.confirm_timeout,
					)
					.await
				{
					ConfirmWait::Answered(ConfirmAnswer::Confirmed) => {
						return self
							.finalize_accepted(request, &donor, hospital, patient_name, offered_at)
							.await;
					},
					// An unconfirmed acceptance counts as a decline
					ConfirmWait::Answered(ConfirmAnswer::Cancelled) | ConfirmWait::TimedOut => {
						ResponseOutcome::Cancelled
					},
				}
			},
			OfferWait::Answered(OfferAnswer::Declined) => ResponseOutcome::Declined,
			OfferWait::TimedOut => ResponseOutcome::TimedOut,
		};

		self.record_outcome(request, &donor, hospital, outcome, offered_at)
			.await
	}

	/// Log a non-accepting outcome and inform the hospital
	async fn record_outcome(
		&self,
		request: &DonationRequest,
		donor: &Donor,
		hospital: &Hospital,
		outcome: ResponseOutcome,
		offered_at: chrono::DateTime<Utc>,
	) -> Result<OfferStep, CascadeError> {
		self.storage
			.release_donor(&donor.donor_id, &request.request_id)
			.await?;
		self.storage
			.clear_offer(&donor.donor_id, &request.request_id)
			.await?;

		let appended = self
			.storage
			.append_response(
				&request.request_id,
				DonorResponse {
					donor_id: donor.donor_id.clone(),
					outcome,
					offered_at,
					responded_at: Utc::now(),
				},
			)
			.await?;
		if !appended {
			debug!(
				request_id = %request.request_id,
				"Request finalized concurrently, dropping outcome"
			);
			return Ok(OfferStep::Finalized);
		}

		self.dispatcher
			.notify_outcome(
				&hospital.hospital_id,
				outcome_entry(request, Some(donor), outcome.into()),
			)
			.await?;
		Ok(OfferStep::Recorded(outcome))
	}

	/// The accepting transition: one-time CAS, then the side effects
	async fn finalize_accepted(
		&self,
		request: &DonationRequest,
		donor: &Donor,
		hospital: &Hospital,
		patient_name: &str,
		offered_at: chrono::DateTime<Utc>,
	) -> Result<OfferStep, CascadeError> {
		let responded_at = Utc::now();
		let won = self
			.storage
			.finalize_request(
				&request.request_id,
				FinalOutcome::Accepted(AcceptedDonor {
					donor_id: donor.donor_id.clone(),
					name: donor.full_name(),
					phone: donor.personal.phone.clone(),
					city: donor.personal.city.clone(),
				}),
				Some(DonorResponse {
					donor_id: donor.donor_id.clone(),
					outcome: ResponseOutcome::Accepted,
					offered_at,
					responded_at,
				}),
			)
			.await?;

		self.storage
			.release_donor(&donor.donor_id, &request.request_id)
			.await?;
		self.storage
			.clear_offer(&donor.donor_id, &request.request_id)
			.await?;

		if !won {
			debug!(
				request_id = %request.request_id,
				donor_id = %donor.donor_id,
				"Lost the finalize race, abandoning"
			);
			self.dispatcher
				.notify_already_finalized(&donor.donor_id, &request.request_id);
			return Ok(OfferStep::Finalized);
		}

		self.storage
			.record_donation(&donor.donor_id, request.organ.as_deref())
			.await?;
		self.storage
			.append_donation_record(
				&hospital.hospital_id,
				DonationRecord {
					donor_id: donor.donor_id.clone(),
					donor_name: donor.full_name(),
					target: request.target().to_string(),
					patient_id: request.patient_id.clone(),
					patient_name: patient_name.to_string(),
					donated_at: responded_at,
				},
			)
			.await?;
		self.dispatcher
			.notify_outcome(
				&hospital.hospital_id,
				outcome_entry(request, Some(donor), CascadeOutcome::Accepted),
			)
			.await?;

		info!(
			request_id = %request.request_id,
			donor_id = %donor.donor_id,
			"Request accepted and finalized"
		);
		Ok(OfferStep::Finalized)
	}

	/// The exhausting transition: CAS plus the final hospital notice
	async fn finalize_exhausted(
		&self,
		request: &DonationRequest,
		hospital: &Hospital,
	) -> Result<(), CascadeError> {
		let won = self
			.storage
			.finalize_request(&request.request_id, FinalOutcome::Exhausted, None)
			.await?;
		if !won {
			return Ok(());
		}

		self.dispatcher
			.notify_outcome(
				&hospital.hospital_id,
				outcome_entry(request, None, CascadeOutcome::Exhausted),
			)
			.await?;
		info!(request_id = %request.request_id, "Request exhausted");
		Ok(())
	}
}

/// Build a hospital outcome entry for one candidate or the final notice
fn outcome_entry(
	request: &DonationRequest,
	donor: Option<&Donor>,
	outcome: CascadeOutcome,
) -> OutcomeEntry {
	OutcomeEntry {
		donor: donor.map(|d| DonorSummary {
			donor_id: d.donor_id.clone(),
			name: d.full_name(),
			city: d.personal.city.clone(),
			age: d.personal.age,
			phone: d.personal.phone.clone(),
		}),
		request_id: request.request_id.clone(),
		target: request.target().to_string(),
		urgency: request.urgency,
		outcome,
		created_at: Utc::now(),
	}
}
