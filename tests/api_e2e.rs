//! E2E tests for the HTTP API

mod mocks;

use reqwest::Client;
use serde_json::json;

use lifelink::DonorAction;

use mocks::{donor, kidney_payload, patient_cascade, wait_for_offer, TestServer};

#[tokio::test]
async fn health_reports_dependencies() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![])
		.await
		.unwrap();
	let client = Client::new();

	let resp = client
		.get(format!("{}/health", server.base_url))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::OK);
	let json: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(json["status"], "ok");
	assert_eq!(json["storage"], true);
	assert_eq!(json["predictor"], true);

	server.abort();
}

#[tokio::test]
async fn create_request_returns_ranked_matches() {
	let server =
		TestServer::spawn_with_donors(patient_cascade(), vec![donor("d1", 30), donor("d2", 40)])
			.await
			.unwrap();
	let client = Client::new();

	let resp = client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&kidney_payload())
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
	let json: serde_json::Value = resp.json().await.unwrap();
	let request = &json["request"];
	assert_eq!(request["target"], "Kidney");
	assert_eq!(request["status"], "pending");
	let matches = request["matches"].as_array().unwrap();
	assert_eq!(matches.len(), 2);
	assert_eq!(matches[0]["donor_id"], "d1");

	// The request is retrievable
	let request_id = request["request_id"].as_str().unwrap();
	let resp = client
		.get(format!("{}/api/v1/requests/{}", server.base_url, request_id))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::OK);

	server.abort();
}

#[tokio::test]
async fn duplicate_request_is_a_bad_request() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![donor("d1", 30)])
		.await
		.unwrap();
	let client = Client::new();

	let first = client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&kidney_payload())
		.send()
		.await
		.unwrap();
	assert_eq!(first.status(), reqwest::StatusCode::CREATED);

	let second = client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&kidney_payload())
		.send()
		.await
		.unwrap();
	assert_eq!(second.status(), reqwest::StatusCode::BAD_REQUEST);
	let json: serde_json::Value = second.json().await.unwrap();
	assert_eq!(json["error"], "DUPLICATE_REQUEST");

	server.abort();
}

#[tokio::test]
async fn unknown_patient_is_not_found() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![])
		.await
		.unwrap();
	let client = Client::new();

	let mut payload = kidney_payload();
	payload.patient_id = "missing".to_string();
	let resp = client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&payload)
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

	server.abort();
}

#[tokio::test]
async fn malformed_payload_is_unprocessable() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![])
		.await
		.unwrap();
	let client = Client::new();

	// Missing urgency: serde rejects before the handler runs
	let resp = client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&json!({ "patient_id": "p1", "hospital_id": "h1" }))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

	server.abort();
}

#[tokio::test]
async fn hospital_request_listing_is_newest_first() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![donor("d1", 30)])
		.await
		.unwrap();
	let client = Client::new();

	client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&kidney_payload())
		.send()
		.await
		.unwrap();

	let resp = client
		.get(format!("{}/api/v1/hospitals/h1/requests", server.base_url))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::OK);
	let requests: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(requests.as_array().unwrap().len(), 1);

	server.abort();
}

#[tokio::test]
async fn donor_offers_and_rest_respond_flow() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![donor("d1", 30)])
		.await
		.unwrap();
	let client = Client::new();

	let resp = client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&kidney_payload())
		.send()
		.await
		.unwrap();
	let json: serde_json::Value = resp.json().await.unwrap();
	let request_id = json["request"]["request_id"].as_str().unwrap().to_string();

	wait_for_offer(&server.state, "d1", &request_id).await;

	// The durable queue is visible over the API
	let resp = client
		.get(format!("{}/api/v1/donors/d1/offers", server.base_url))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::OK);
	let offers: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(offers["offers"].as_array().unwrap().len(), 1);

	// Decline over the REST fallback. The cascade registers its waiter just
	// after dispatching, so retry until the signal lands.
	let mut delivered = false;
	for _ in 0..100 {
		let resp = client
			.post(format!("{}/api/v1/donors/d1/respond", server.base_url))
			.json(&json!({ "request_id": request_id, "action": DonorAction::Decline }))
			.send()
			.await
			.unwrap();
		assert_eq!(resp.status(), reqwest::StatusCode::OK);
		let body: serde_json::Value = resp.json().await.unwrap();
		if body["delivered"] == true {
			delivered = true;
			break;
		}
		tokio::time::sleep(std::time::Duration::from_millis(10)).await;
	}
	assert!(delivered);

	server.abort();
}

#[tokio::test]
async fn hospital_notifications_clear_on_acknowledgment() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![])
		.await
		.unwrap();
	let client = Client::new();

	// An empty ranking produces one exhaustion notification
	let resp = client
		.post(format!("{}/api/v1/requests", server.base_url))
		.json(&kidney_payload())
		.send()
		.await
		.unwrap();
	let json: serde_json::Value = resp.json().await.unwrap();
	let request_id = json["request"]["request_id"].as_str().unwrap().to_string();

	mocks::wait_for_finalized(&server.state, &request_id).await;

	let resp = client
		.get(format!(
			"{}/api/v1/hospitals/h1/notifications",
			server.base_url
		))
		.send()
		.await
		.unwrap();
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["notifications"].as_array().unwrap().len(), 1);

	let resp = client
		.post(format!(
			"{}/api/v1/hospitals/h1/notifications/clear",
			server.base_url
		))
		.json(&json!({ "request_id": request_id }))
		.send()
		.await
		.unwrap();
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["cleared"], 1);

	let resp = client
		.get(format!(
			"{}/api/v1/hospitals/h1/notifications",
			server.base_url
		))
		.send()
		.await
		.unwrap();
	let body: serde_json::Value = resp.json().await.unwrap();
	assert!(body["notifications"].as_array().unwrap().is_empty());

	server.abort();
}

#[tokio::test]
async fn deleting_a_request_is_idempotent_for_missing_ids() {
	let server = TestServer::spawn_with_donors(patient_cascade(), vec![])
		.await
		.unwrap();
	let client = Client::new();

	let resp = client
		.delete(format!("{}/api/v1/requests/unknown", server.base_url))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

	server.abort();
}
