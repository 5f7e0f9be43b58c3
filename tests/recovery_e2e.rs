//! Restart recovery: a cascade interrupted mid-offer resumes conservatively

mod mocks;

use std::sync::Arc;

use lifelink::chrono::Utc;
use lifelink::mocks::{mock_hospital, mock_patient, MockPredictor};
use lifelink::types::{CurrentOffer, PendingOffer, RankedDonor};
use lifelink::{
	CascadeOutcome, DonorStorage, HospitalStorage, LifelinkBuilder, MemoryStore, RequestStatus,
	RequestStorage, ResponseOutcome, Urgency,
};

use mocks::{donor, fast_cascade, wait_for_finalized};

/// Storage state as a crashed process would have left it: the request is
/// unfinalized at offer_index 0, the first donor still holds the
/// reservation and the queued offer.
async fn crashed_store() -> (MemoryStore, String) {
	let store = MemoryStore::new();

	let mut d1 = donor("d1", 30);
	let d2 = donor("d2", 40);

	let mut request = lifelink::DonationRequest::new(
		"p1".to_string(),
		"h1".to_string(),
		Some("Kidney".to_string()),
		Urgency::High,
		None,
	);
	request.ranked_donors = vec![
		RankedDonor {
			donor_id: "d1".to_string(),
			name: d1.full_name(),
			age: 30,
			city: "Pune".to_string(),
			blood_group: "O+".to_string(),
			score: 0.9,
		},
		RankedDonor {
			donor_id: "d2".to_string(),
			name: d2.full_name(),
			age: 40,
			city: "Pune".to_string(),
			blood_group: "O+".to_string(),
			score: 0.8,
		},
	];
	let request_id = request.request_id.clone();

	d1.current_offer = Some(CurrentOffer {
		request_id: request_id.clone(),
		target: "Kidney".to_string(),
		urgency: Urgency::High,
		offered_at: Utc::now(),
	});
	d1.pending_offers.push(PendingOffer {
		request_id: request_id.clone(),
		target: "Kidney".to_string(),
		urgency: Urgency::High,
		hospital_name: "City Care Hospital".to_string(),
		hospital_city: "Pune".to_string(),
		created_at: Utc::now(),
	});

	store.create_donor(d1).await.unwrap();
	store.create_donor(d2).await.unwrap();
	store.create_request(request).await.unwrap();

	(store, request_id)
}

#[tokio::test]
async fn restart_expires_the_inflight_offer_and_resumes() {
	let (store, request_id) = crashed_store().await;

	// "Restart": a fresh process over the surviving storage
	let (_router, state) = LifelinkBuilder::with_storage(store)
		.with_predictor(Arc::new(MockPredictor::scoring(0.9)))
		.with_cascade_config(fast_cascade())
		.with_hospital(mock_hospital("h1"))
		.with_patient(mock_patient("p1", 30))
		.start()
		.await
		.unwrap();

	// Nobody answers the resumed cascade either; it runs to exhaustion
	wait_for_finalized(&state, &request_id).await;

	let stored = state.storage.get_request(&request_id).await.unwrap().unwrap();
	assert_eq!(stored.status, RequestStatus::Exhausted);

	// The interrupted offer was expired, not silently resumed
	assert_eq!(stored.responses.len(), 2);
	assert_eq!(stored.responses[0].donor_id, "d1");
	assert_eq!(stored.responses[0].outcome, ResponseOutcome::TimedOut);
	assert_eq!(stored.responses[1].donor_id, "d2");
	assert_eq!(stored.responses[1].outcome, ResponseOutcome::TimedOut);

	// The reservation and the stale queued offer are gone
	let d1 = state.storage.get_donor("d1").await.unwrap().unwrap();
	assert!(d1.current_offer.is_none());
	assert!(d1.pending_offers.is_empty());

	// The hospital saw both timeouts and the exhaustion notice
	let hospital = state.storage.get_hospital("h1").await.unwrap().unwrap();
	assert_eq!(hospital.outcome_log.len(), 3);
	assert_eq!(
		hospital.outcome_log.last().unwrap().outcome,
		CascadeOutcome::Exhausted
	);
}
