//! Realtime gateway
//!
//! One WebSocket per participant, keyed by identity. Outbound frames are
//! serialized [`ChannelEvent`]s; inbound frames from donors are offer
//! answers routed through the signal router. Connecting as a donor drains
//! the durable pending queue; connecting as a hospital replays
//! unacknowledged outcomes without clearing them.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use lifelink_types::{DonorAction, DonorSignal};

use crate::state::AppState;

/// Which side of the channel the participant is on
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Donor,
	Hospital,
}

/// Connection parameters: `/api/v1/ws?participant={id}&role=donor`
#[derive(Debug, Deserialize)]
pub struct WsParams {
	pub participant: String,
	pub role: Role,
}

/// Inbound donor frame; the donor id comes from the connection
#[derive(Debug, Deserialize)]
struct InboundSignal {
	request_id: String,
	action: DonorAction,
}

/// GET /api/v1/ws - upgrade and join the participant's channel
pub async fn ws_gateway(
	State(state): State<AppState>,
	Query(params): Query<WsParams>,
	ws: WebSocketUpgrade,
) -> Response {
	ws.on_upgrade(move |socket| handle_socket(state, params, socket))
}

async fn handle_socket(state: AppState, params: WsParams, socket: WebSocket) {
	let (mut sink, mut stream) = socket.split();
	let (ticket, mut events) = state.hub.connect(&params.participant);

	// Deliver what accumulated while the participant was offline
	let catch_up = match params.role {
		Role::Donor => state.dispatcher.drain_donor_queue(&params.participant).await,
		Role::Hospital => {
			state
				.dispatcher
				.replay_hospital_notifications(&params.participant)
				.await
		},
	};
	match catch_up {
		Ok(delivered) if delivered > 0 => {
			debug!(
				participant = %params.participant,
				delivered,
				"Catch-up delivery complete"
			);
		},
		Ok(_) => {},
		Err(e) => {
			warn!(
				participant = %params.participant,
				error = %e,
				"Catch-up delivery failed"
			);
		},
	}

	loop {
		tokio::select! {
			event = events.recv() => {
				let Some(event) = event else {
					// A newer connection replaced this one
					break;
				};
				let frame = match serde_json::to_string(&event) {
					Ok(frame) => frame,
					Err(e) => {
						warn!(error = %e, "Dropping unserializable event");
						continue;
					},
				};
				if sink.send(Message::Text(frame.into())).await.is_err() {
					break;
				}
			},
			inbound = stream.next() => {
				match inbound {
					Some(Ok(Message::Text(text))) => {
						if params.role == Role::Donor {
							handle_inbound(&state, &params.participant, text.as_str()).await;
						}
					},
					Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
					Some(Ok(_)) => {},
				}
			},
		}
	}

	state.hub.disconnect(&params.participant, ticket);
}

async fn handle_inbound(state: &AppState, donor_id: &str, frame: &str) {
	let inbound: InboundSignal = match serde_json::from_str(frame) {
		Ok(inbound) => inbound,
		Err(e) => {
			debug!(donor_id, error = %e, "Ignoring malformed inbound frame");
			return;
		},
	};

	let signal = DonorSignal {
		donor_id: donor_id.to_string(),
		request_id: inbound.request_id,
		action: inbound.action,
	};
	if let Err(e) = state.signal_router.handle(&signal).await {
		warn!(donor_id, error = %e, "Signal routing failed");
	}
}
