//! Typed real-time channel events
//!
//! Replaces ad hoc per-donor event names with serde enums: `DonorSignal` is
//! what the gateway consumes from donors, `ChannelEvent` is what the core
//! pushes to connected participants.

use serde::{Deserialize, Serialize};

use crate::donors::PendingOffer;
use crate::hospitals::OutcomeEntry;

/// Actions a donor can take on an offer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonorAction {
	/// Accept the outstanding offer
	Accept,
	/// Decline the outstanding offer
	Decline,
	/// Confirm a previously accepted offer
	Confirm,
	/// Cancel a previously accepted offer
	Cancel,
}

/// Inbound donor message, keyed by (donor, request)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonorSignal {
	pub donor_id: String,
	pub request_id: String,
	pub action: DonorAction,
}

/// Outbound push message to a connected participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ChannelEvent {
	/// A new offer for a donor
	Offer(PendingOffer),
	/// Ask the accepting donor for the explicit second confirmation
	ConfirmationRequest { request_id: String },
	/// Outcome of a completed offer, pushed to the owning hospital
	OutcomeUpdate(OutcomeEntry),
	/// Answer to a donor whose response arrived after finalization
	AlreadyFinalized { request_id: String },
	/// The hospital retracted the request
	RequestDeleted { request_id: String },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn donor_signal_round_trips_lowercase_actions() {
		let json = r#"{"donor_id":"d1","request_id":"r1","action":"confirm"}"#;
		let signal: DonorSignal = serde_json::from_str(json).unwrap();
		assert_eq!(signal.action, DonorAction::Confirm);
	}

	#[test]
	fn channel_events_are_tagged_camel_case() {
		let event = ChannelEvent::AlreadyFinalized {
			request_id: "r1".to_string(),
		};
		let json = serde_json::to_string(&event).unwrap();
		assert!(json.contains(r#""event":"alreadyFinalized""#));
	}
}
