//! Startup recovery sweep
//!
//! Reloads every non-finalized request after a restart and resumes its
//! cascade. Remaining deadlines are recomputed conservatively: an offer that
//! was in flight when the process died is treated as already expired, never
//! as a paused clock.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use lifelink_storage::{DonorStorage, RequestStorage, Storage};
use lifelink_types::storage::StorageResult;
use lifelink_types::{
	CascadeOutcome, DonationRequest, DonorResponse, DonorSummary, OutcomeEntry, ResponseOutcome,
};

use crate::dispatch::NotificationDispatcher;
use crate::lifecycle::CascadeEngine;

/// Resumes in-flight cascades after a process restart
pub struct RecoveryService {
	storage: Arc<dyn Storage>,
	engine: Arc<CascadeEngine>,
	dispatcher: Arc<NotificationDispatcher>,
}

impl RecoveryService {
	pub fn new(
		storage: Arc<dyn Storage>,
		engine: Arc<CascadeEngine>,
		dispatcher: Arc<NotificationDispatcher>,
	) -> Self {
		Self {
			storage,
			engine,
			dispatcher,
		}
	}

	/// Sweep storage for non-finalized requests and respawn their cascades.
	/// Returns how many cascades were resumed.
	pub async fn resume_pending(&self) -> StorageResult<usize> {
		let pending = self.storage.get_unfinalized_requests().await?;
		if pending.is_empty() {
			return Ok(0);
		}
		info!(count = pending.len(), "Resuming unfinalized requests");

		let mut resumed = 0;
		for request in pending {
			if let Err(e) = self.expire_inflight_offer(&request).await {
				// Leave this request for the next sweep rather than resume
				// it with a half-recorded offer
				warn!(
					request_id = %request.request_id,
					error = %e,
					"Could not expire the in-flight offer, skipping resume"
				);
				continue;
			}
			self.engine.spawn(request.request_id.clone());
			resumed += 1;
		}
		Ok(resumed)
	}

	/// If the candidate at `offer_index` was holding an undecided offer when
	/// the process died, record it as timed out so the resumed loop starts
	/// at the next untried candidate.
	async fn expire_inflight_offer(&self, request: &DonationRequest) -> StorageResult<()> {
		let Some(candidate) = request.ranked_donors.get(request.offer_index) else {
			return Ok(());
		};
		if request.has_response_for(&candidate.donor_id) {
			return Ok(());
		}

		// Only a donor still reserved by this request proves an offer was
		// actually dispatched; otherwise the loop simply re-offers.
		let donor = self.storage.get_donor(&candidate.donor_id).await?;
		let Some(donor) = donor else {
			return Ok(());
		};
		let in_flight = donor
			.current_offer
			.as_ref()
			.is_some_and(|c| c.request_id == request.request_id);
		if !in_flight {
			return Ok(());
		}

		info!(
			request_id = %request.request_id,
			donor_id = %donor.donor_id,
			"Expiring the offer that was in flight at shutdown"
		);

		self.storage
			.release_donor(&donor.donor_id, &request.request_id)
			.await?;
		self.storage
			.clear_offer(&donor.donor_id, &request.request_id)
			.await?;

		let offered_at = donor
			.current_offer
			.as_ref()
			.map(|c| c.offered_at)
			.unwrap_or_else(Utc::now);
		let appended = self
			.storage
			.append_response(
				&request.request_id,
				DonorResponse {
					donor_id: donor.donor_id.clone(),
					outcome: ResponseOutcome::TimedOut,
					offered_at,
					responded_at: Utc::now(),
				},
			)
			.await?;

		if appended {
			let entry = OutcomeEntry {
				donor: Some(DonorSummary {
					donor_id: donor.donor_id.clone(),
					name: donor.full_name(),
					city: donor.personal.city.clone(),
					age: donor.personal.age,
					phone: donor.personal.phone.clone(),
				}),
				request_id: request.request_id.clone(),
				target: request.target().to_string(),
				urgency: request.urgency,
				outcome: CascadeOutcome::TimedOut,
				created_at: Utc::now(),
			};
			self.dispatcher
				.notify_outcome(&request.hospital_id, entry)
				.await?;
		}
		Ok(())
	}
}
