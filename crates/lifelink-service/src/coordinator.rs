//! Response/timeout coordinator
//!
//! Races donor answers against wall-clock deadlines, one waiter per
//! (request, donor) pair and phase. Exactly one signal resolves a wait: the
//! waiter is removed from the registry atomically on resolve, and the timer
//! and channel are dropped as soon as the race settles. Signals that find no
//! waiter are reported back to the caller as undelivered.

use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::debug;

/// Donor answer to an outstanding offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAnswer {
	Accepted,
	Declined,
}

/// Donor answer to the confirmation handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAnswer {
	Confirmed,
	Cancelled,
}

/// Result of racing an offer against its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferWait {
	Answered(OfferAnswer),
	TimedOut,
}

/// Result of racing a confirmation against its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmWait {
	Answered(ConfirmAnswer),
	TimedOut,
}

type WaiterKey = (String, String);

/// Registry of in-flight waits
#[derive(Default)]
pub struct ResponseCoordinator {
	offer_waiters: DashMap<WaiterKey, oneshot::Sender<OfferAnswer>>,
	confirm_waiters: DashMap<WaiterKey, oneshot::Sender<ConfirmAnswer>>,
}

impl ResponseCoordinator {
	pub fn new() -> Self {
		Self::default()
	}

	fn key(request_id: &str, donor_id: &str) -> WaiterKey {
		(request_id.to_string(), donor_id.to_string())
	}

	/// Wait for the donor's accept/decline, or until the deadline elapses
	pub async fn wait_offer(
		&self,
		request_id: &str,
		donor_id: &str,
		deadline: Duration,
	) -> OfferWait {
		let key = Self::key(request_id, donor_id);
		let (tx, rx) = oneshot::channel();
		self.offer_waiters.insert(key.clone(), tx);

		let outcome = match tokio::time::timeout(deadline, rx).await {
			Ok(Ok(answer)) => OfferWait::Answered(answer),
			// Sender dropped or deadline elapsed; either way the offer is over
			Ok(Err(_)) | Err(_) => OfferWait::TimedOut,
		};
		self.offer_waiters.remove(&key);
		outcome
	}

	/// Wait for the donor's confirm/cancel, or until the deadline elapses
	pub async fn wait_confirmation(
		&self,
		request_id: &str,
		donor_id: &str,
		deadline: Duration,
	) -> ConfirmWait {
		let key = Self::key(request_id, donor_id);
		let (tx, rx) = oneshot::channel();
		self.confirm_waiters.insert(key.clone(), tx);

		let outcome = match tokio::time::timeout(deadline, rx).await {
			Ok(Ok(answer)) => ConfirmWait::Answered(answer),
			Ok(Err(_)) | Err(_) => ConfirmWait::TimedOut,
		};
		self.confirm_waiters.remove(&key);
		outcome
	}

	/// Deliver an accept/decline. Returns whether a waiter received it;
	/// a late or duplicate signal finds no waiter and is dropped.
	pub fn resolve_offer(&self, request_id: &str, donor_id: &str, answer: OfferAnswer) -> bool {
		match self.offer_waiters.remove(&Self::key(request_id, donor_id)) {
			Some((_, tx)) => tx.send(answer).is_ok(),
			None => {
				debug!(request_id, donor_id, ?answer, "No offer waiter for signal");
				false
			},
		}
	}

	/// Deliver a confirm/cancel. Same contract as [`Self::resolve_offer`].
	pub fn resolve_confirmation(
		&self,
		request_id: &str,
		donor_id: &str,
		answer: ConfirmAnswer,
	) -> bool {
		match self.confirm_waiters.remove(&Self::key(request_id, donor_id)) {
			Some((_, tx)) => tx.send(answer).is_ok(),
			None => {
				debug!(request_id, donor_id, ?answer, "No confirmation waiter for signal");
				false
			},
		}
	}

	/// Drop every waiter attached to a request, resolving its races as
	/// timeouts. Used when a request is retracted mid-cascade.
	pub fn cancel_request(&self, request_id: &str) {
		self.offer_waiters.retain(|(r, _), _| r != request_id);
		self.confirm_waiters.retain(|(r, _), _| r != request_id);
	}

	/// Number of in-flight waits, for diagnostics
	pub fn waiter_count(&self) -> usize {
		self.offer_waiters.len() + self.confirm_waiters.len()
	}
}
