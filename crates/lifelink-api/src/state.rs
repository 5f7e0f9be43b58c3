use std::sync::Arc;

use lifelink_service::{
	ConnectionHub, NotificationDispatcher, RequestService, SignalRouter,
};
use lifelink_storage::Storage;
use lifelink_types::MatchPredictor;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub request_service: Arc<RequestService>,
	pub signal_router: Arc<SignalRouter>,
	pub dispatcher: Arc<NotificationDispatcher>,
	pub hub: Arc<ConnectionHub>,
	pub storage: Arc<dyn Storage>,
	pub predictor: Arc<dyn MatchPredictor>,
}
