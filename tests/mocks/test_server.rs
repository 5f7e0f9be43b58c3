//! Test server for integration tests

use std::sync::Arc;

use tokio::task::JoinHandle;

use lifelink::mocks::{mock_hospital, mock_patient, MockPredictor};
use lifelink::service::CascadeConfig;
use lifelink::{AppState, Donor, LifelinkBuilder};

/// Test server instance bound to an ephemeral port
pub struct TestServer {
	pub base_url: String,
	pub state: AppState,
	handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn a server with the standard fixtures and the given donors
	pub async fn spawn_with_donors(
		config: CascadeConfig,
		donors: Vec<Donor>,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let mut builder = LifelinkBuilder::default()
			.with_predictor(Arc::new(MockPredictor::scoring(0.9)))
			.with_cascade_config(config)
			.with_hospital(mock_hospital("h1"))
			.with_patient(mock_patient("p1", 30));
		for donor in donors {
			builder = builder.with_donor(donor);
		}
		let (router, state) = builder.start().await?;

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, router).await;
		});

		Ok(Self {
			base_url: format!("http://{}", addr),
			state,
			handle,
		})
	}

	/// Stop the server
	pub fn abort(&self) {
		self.handle.abort();
	}
}
