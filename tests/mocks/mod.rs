//! Centralized fixtures and helpers for integration tests

// Each test binary uses its own subset of these helpers
#![allow(dead_code)]

pub mod test_server;

pub use test_server::TestServer;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use lifelink::mocks::{mock_donor, mock_hospital, mock_patient, MockPredictor};
use lifelink::service::CascadeConfig;
use lifelink::{
	AppState, CreateRequestPayload, Donor, DonorStorage, LifelinkBuilder, RequestStorage, Urgency,
};

/// Deadlines short enough for tests that exercise timeouts
pub fn fast_cascade() -> CascadeConfig {
	CascadeConfig {
		offer_timeout: Duration::from_millis(400),
		confirm_timeout: Duration::from_millis(400),
	}
}

/// Deadlines long enough that only explicit signals resolve races
pub fn patient_cascade() -> CascadeConfig {
	CascadeConfig {
		offer_timeout: Duration::from_secs(10),
		confirm_timeout: Duration::from_secs(10),
	}
}

/// Standard app: one hospital, one patient (age 30), the given donors,
/// a predictor scoring everyone 0.9
pub async fn app_with_donors(config: CascadeConfig, donors: Vec<Donor>) -> AppState {
	let mut builder = LifelinkBuilder::default()
		.with_predictor(Arc::new(MockPredictor::scoring(0.9)))
		.with_cascade_config(config)
		.with_hospital(mock_hospital("h1"))
		.with_patient(mock_patient("p1", 30));
	for donor in donors {
		builder = builder.with_donor(donor);
	}
	let (_router, state) = builder.start().await.expect("builder start");
	state
}

/// Donor fixture; ranking order follows age distance to the patient (30)
pub fn donor(donor_id: &str, age: u32) -> Donor {
	mock_donor(donor_id, age)
}

/// A kidney request payload for the standard fixtures
pub fn kidney_payload() -> CreateRequestPayload {
	CreateRequestPayload {
		patient_id: "p1".to_string(),
		hospital_id: "h1".to_string(),
		organ: Some("Kidney".to_string()),
		urgency: Urgency::High,
		notes: None,
	}
}

/// Poll until the condition holds or the deadline passes
pub async fn wait_until<F, Fut>(what: &str, mut check: F)
where
	F: FnMut() -> Fut,
	Fut: Future<Output = bool>,
{
	let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
	loop {
		if check().await {
			return;
		}
		if tokio::time::Instant::now() > deadline {
			panic!("timed out waiting for: {}", what);
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
}

/// Wait until the donor holds the current offer for the request, i.e. the
/// cascade has dispatched to them
pub async fn wait_for_offer(state: &AppState, donor_id: &str, request_id: &str) {
	let storage = Arc::clone(&state.storage);
	let donor_id = donor_id.to_string();
	let request_id = request_id.to_string();
	wait_until("offer dispatched", move || {
		let storage = Arc::clone(&storage);
		let donor_id = donor_id.clone();
		let request_id = request_id.clone();
		async move {
			storage
				.get_donor(&donor_id)
				.await
				.ok()
				.flatten()
				.and_then(|d| d.current_offer)
				.is_some_and(|c| c.request_id == request_id)
		}
	})
	.await;
}

/// Wait until the request is finalized
pub async fn wait_for_finalized(state: &AppState, request_id: &str) {
	let storage = Arc::clone(&state.storage);
	let request_id = request_id.to_string();
	wait_until("request finalized", move || {
		let storage = Arc::clone(&storage);
		let request_id = request_id.clone();
		async move {
			storage
				.get_request(&request_id)
				.await
				.ok()
				.flatten()
				.is_some_and(|r| r.finalized)
		}
	})
	.await;
}

/// Wait until the request has logged the given number of responses
pub async fn wait_for_responses(state: &AppState, request_id: &str, count: usize) {
	let storage = Arc::clone(&state.storage);
	let request_id = request_id.to_string();
	wait_until("responses logged", move || {
		let storage = Arc::clone(&storage);
		let request_id = request_id.clone();
		async move {
			storage
				.get_request(&request_id)
				.await
				.ok()
				.flatten()
				.is_some_and(|r| r.responses.len() >= count)
		}
	})
	.await;
}
