//! Connection hub for the real-time channel
//!
//! Tracks one live channel per participant (donor or hospital), keyed by
//! identity. Pushes are fire-and-forget: a failed push is never fatal,
//! delivery falls back to the durable queues. Connections carry a ticket so
//! a stale handler can never evict the channel that replaced it.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use lifelink_types::ChannelEvent;

/// Registry of live participant channels
#[derive(Default)]
pub struct ConnectionHub {
	connections: DashMap<String, (u64, mpsc::UnboundedSender<ChannelEvent>)>,
	next_ticket: AtomicU64,
}

impl ConnectionHub {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a participant's channel. A reconnect replaces the previous
	/// channel; the stale sender is dropped and its receiver closes. The
	/// returned ticket identifies this connection for [`Self::disconnect`].
	pub fn connect(&self, participant_id: &str) -> (u64, mpsc::UnboundedReceiver<ChannelEvent>) {
		let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = mpsc::unbounded_channel();
		self.connections
			.insert(participant_id.to_string(), (ticket, tx));
		debug!(participant_id, ticket, "Participant connected");
		(ticket, rx)
	}

	/// Drop a participant's channel, but only if it is still the connection
	/// the ticket was issued for
	pub fn disconnect(&self, participant_id: &str, ticket: u64) {
		let removed = self
			.connections
			.remove_if(participant_id, |_, (current, _)| *current == ticket)
			.is_some();
		if removed {
			debug!(participant_id, ticket, "Participant disconnected");
		}
	}

	/// Whether the participant currently holds a live channel
	pub fn is_connected(&self, participant_id: &str) -> bool {
		self.connections.contains_key(participant_id)
	}

	/// Push an event to a connected participant. Returns whether the event
	/// was handed to a live channel; stale channels are evicted.
	pub fn push(&self, participant_id: &str, event: ChannelEvent) -> bool {
		let (ticket, delivered) = match self.connections.get(participant_id) {
			Some(entry) => {
				let (ticket, tx) = entry.value();
				(*ticket, tx.send(event).is_ok())
			},
			None => return false,
		};
		if !delivered {
			// Receiver went away without a disconnect
			self.disconnect(participant_id, ticket);
		}
		delivered
	}

	/// Number of live channels
	pub fn connected_count(&self) -> usize {
		self.connections.len()
	}
}
