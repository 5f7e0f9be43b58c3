//! Inbound donor signal routing
//!
//! The single entry point for donor accept/decline/confirm/cancel, whether
//! they arrive over the realtime gateway or the REST fallback. Signals for
//! finalized requests are answered with `AlreadyFinalized`; signals that find
//! no waiter are acknowledged and discarded.

use std::sync::Arc;

use tracing::{debug, info};

use lifelink_storage::{RequestStorage, Storage};
use lifelink_types::storage::{StorageError, StorageResult};
use lifelink_types::{DonorAction, DonorSignal};

use crate::coordinator::{ConfirmAnswer, OfferAnswer, ResponseCoordinator};
use crate::dispatch::NotificationDispatcher;

/// What happened to an inbound signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDisposition {
	/// A waiting cascade received the signal
	Delivered,
	/// The request was already finalized; the donor was told so
	AlreadyFinalized,
	/// No cascade was waiting (late, duplicate, or unknown); dropped
	Discarded,
}

/// Routes donor signals into the coordinator
pub struct SignalRouter {
	storage: Arc<dyn Storage>,
	coordinator: Arc<ResponseCoordinator>,
	dispatcher: Arc<NotificationDispatcher>,
}

impl SignalRouter {
	pub fn new(
		storage: Arc<dyn Storage>,
		coordinator: Arc<ResponseCoordinator>,
		dispatcher: Arc<NotificationDispatcher>,
	) -> Self {
		Self {
			storage,
			coordinator,
			dispatcher,
		}
	}

	/// Deliver one donor signal, re-checking finalization at resolution time
	pub async fn handle(&self, signal: &DonorSignal) -> StorageResult<SignalDisposition> {
		let finalized = match self.storage.is_finalized(&signal.request_id).await {
			Ok(finalized) => finalized,
			Err(StorageError::NotFound { .. }) => {
				debug!(
					request_id = %signal.request_id,
					donor_id = %signal.donor_id,
					"Signal for unknown request, discarding"
				);
				return Ok(SignalDisposition::Discarded);
			},
			Err(e) => return Err(e),
		};

		if finalized {
			info!(
				request_id = %signal.request_id,
				donor_id = %signal.donor_id,
				action = ?signal.action,
				"Signal after finalization"
			);
			self.dispatcher
				.notify_already_finalized(&signal.donor_id, &signal.request_id);
			return Ok(SignalDisposition::AlreadyFinalized);
		}

		let delivered = match signal.action {
			DonorAction::Accept => self.coordinator.resolve_offer(
				&signal.request_id,
				&signal.donor_id,
				OfferAnswer::Accepted,
			),
			DonorAction::Decline => self.coordinator.resolve_offer(
				&signal.request_id,
				&signal.donor_id,
				OfferAnswer::Declined,
			),
			DonorAction::Confirm => self.coordinator.resolve_confirmation(
				&signal.request_id,
				&signal.donor_id,
				ConfirmAnswer::Confirmed,
			),
			DonorAction::Cancel => self.coordinator.resolve_confirmation(
				&signal.request_id,
				&signal.donor_id,
				ConfirmAnswer::Cancelled,
			),
		};

		if delivered {
			Ok(SignalDisposition::Delivered)
		} else {
			debug!(
				request_id = %signal.request_id,
				donor_id = %signal.donor_id,
				action = ?signal.action,
				"No cascade waiting for this signal, discarding"
			);
			Ok(SignalDisposition::Discarded)
		}
	}
}
