//! Notification dispatcher
//!
//! Two delivery lines: offers to donors (durable enqueue always, live push
//! when connected) and outcomes to hospitals (durable append always, live
//! push when connected). Push failures never block state progression.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use lifelink_storage::{DonorStorage, HospitalStorage, Storage};
use lifelink_types::storage::StorageResult;
use lifelink_types::{
	ChannelEvent, DonationRequest, Donor, Hospital, OutcomeEntry, PendingOffer,
};

use crate::hub::ConnectionHub;

/// Delivers offers and outcome updates over the durable queues and the hub
pub struct NotificationDispatcher {
	storage: Arc<dyn Storage>,
	hub: Arc<ConnectionHub>,
}

impl NotificationDispatcher {
	pub fn new(storage: Arc<dyn Storage>, hub: Arc<ConnectionHub>) -> Self {
		Self { storage, hub }
	}

	/// Offer a request to a donor: always queued durably (deduplicated by
	/// request id), pushed live when the donor is connected.
	pub async fn send_offer(
		&self,
		donor: &Donor,
		request: &DonationRequest,
		hospital: &Hospital,
	) -> StorageResult<()> {
		let offer = PendingOffer {
			request_id: request.request_id.clone(),
			target: request.target().to_string(),
			urgency: request.urgency,
			hospital_name: hospital.name.clone(),
			hospital_city: hospital.city.clone(),
			created_at: Utc::now(),
		};

		let newly_queued = self
			.storage
			.enqueue_offer(&donor.donor_id, offer.clone())
			.await?;
		if !newly_queued {
			debug!(
				donor_id = %donor.donor_id,
				request_id = %request.request_id,
				"Offer already queued for this request"
			);
		}

		if !self.hub.push(&donor.donor_id, ChannelEvent::Offer(offer)) {
			debug!(
				donor_id = %donor.donor_id,
				request_id = %request.request_id,
				"Donor offline, offer waits in the pending queue"
			);
		}
		Ok(())
	}

	/// Ask the accepting donor for the explicit second confirmation
	pub fn request_confirmation(&self, donor_id: &str, request_id: &str) {
		let delivered = self.hub.push(
			donor_id,
			ChannelEvent::ConfirmationRequest {
				request_id: request_id.to_string(),
			},
		);
		if !delivered {
			// The confirmation deadline keeps running regardless
			warn!(donor_id, request_id, "Confirmation request not delivered");
		}
	}

	/// Record an outcome against the hospital and push it live
	pub async fn notify_outcome(
		&self,
		hospital_id: &str,
		entry: OutcomeEntry,
	) -> StorageResult<()> {
		self.storage.append_outcome(hospital_id, entry.clone()).await?;
		if !self
			.hub
			.push(hospital_id, ChannelEvent::OutcomeUpdate(entry))
		{
			debug!(hospital_id, "Hospital offline, outcome waits in the log");
		}
		Ok(())
	}

	/// Tell a late-responding donor the request is already settled
	pub fn notify_already_finalized(&self, donor_id: &str, request_id: &str) {
		self.hub.push(
			donor_id,
			ChannelEvent::AlreadyFinalized {
				request_id: request_id.to_string(),
			},
		);
	}

	/// Tell the owning hospital a request was retracted
	pub fn notify_request_deleted(&self, hospital_id: &str, request_id: &str) {
		self.hub.push(
			hospital_id,
			ChannelEvent::RequestDeleted {
				request_id: request_id.to_string(),
			},
		);
	}

	/// Donor (re)connected: deliver and clear the whole pending queue.
	/// Undelivered offers are requeued, so nothing is lost if the channel
	/// dies mid-drain and nothing is duplicated on the next reconnect.
	pub async fn drain_donor_queue(&self, donor_id: &str) -> StorageResult<usize> {
		let offers = self.storage.drain_offers(donor_id).await?;
		let total = offers.len();
		if total == 0 {
			return Ok(0);
		}
		debug!(donor_id, count = total, "Draining pending offers");

		for (delivered, offer) in offers.iter().enumerate() {
			if !self.hub.push(donor_id, ChannelEvent::Offer(offer.clone())) {
				warn!(donor_id, "Channel lost mid-drain, requeueing the rest");
				for offer in &offers[delivered..] {
					self.storage.enqueue_offer(donor_id, offer.clone()).await?;
				}
				return Ok(delivered);
			}
		}
		Ok(total)
	}

	/// Hospital (re)connected: replay unacknowledged outcomes. The pending
	/// list is kept; it only clears on explicit acknowledgment.
	pub async fn replay_hospital_notifications(&self, hospital_id: &str) -> StorageResult<usize> {
		let pending = self.storage.get_pending_notifications(hospital_id).await?;
		let mut replayed = 0;
		for entry in pending {
			if self
				.hub
				.push(hospital_id, ChannelEvent::OutcomeUpdate(entry))
			{
				replayed += 1;
			}
		}
		Ok(replayed)
	}
}
