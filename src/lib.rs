//! Lifelink
//!
//! An organ and blood donation matching service: hospitals raise requests,
//! an external predictor scores consenting donors, and a sequential offer
//! cascade runs until one donor accepts or every candidate is exhausted.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use lifelink_predictor::HttpPredictor;
use lifelink_service::{
	CascadeConfig, CascadeEngine, ConnectionHub, MatcherService, NotificationDispatcher,
	RecoveryService, RequestService, ResponseCoordinator, SignalRouter,
};

// Core domain types - the most commonly used types
pub use lifelink_types::{
	chrono,
	// External dependencies for convenience
	serde_json,
	AcceptedDonor,
	CascadeOutcome,
	ChannelEvent,
	CreateRequestPayload,
	DonationRequest,
	Donor,
	DonorAction,
	DonorError,
	DonorResponse,
	DonorSignal,
	FeatureVector,
	Hospital,
	HospitalError,
	// Predictor contract
	MatchPredictor,
	OutcomeEntry,
	Patient,
	PendingOffer,
	Prediction,
	PredictorError,
	RankedDonor,
	// Error types
	RequestError,
	RequestStatus,
	ResponseOutcome,
	Urgency,
};

// Service layer
pub use lifelink_service::{RequestServiceError, SignalDisposition};

// Storage layer
pub use lifelink_storage::{
	DonorStorage, HospitalStorage, MemoryStore, PatientStorage, RequestStorage, Storage,
	StorageError, StorageResult,
};

// API layer
pub use lifelink_api::{create_router, AppState};

// Config
pub use lifelink_config::{load_config, LogFormat, Settings};

// Module aliases for downstream use
pub mod types {
	pub use lifelink_types::*;
}

pub mod storage {
	pub use lifelink_storage::*;
}

pub mod config {
	pub use lifelink_config::*;
}

pub mod predictor {
	pub use lifelink_predictor::*;
}

pub mod api {
	pub use lifelink_api::*;
	pub mod routes {
		pub use lifelink_api::{create_router, AppState};
	}
}

pub mod service {
	pub use lifelink_service::*;
}

pub mod mocks;

// Re-export external dependencies for downstream tests
pub use async_trait;

/// Builder pattern for configuring the matching service
pub struct LifelinkBuilder<S = MemoryStore>
where
	S: Storage + Clone + 'static,
{
	settings: Option<Settings>,
	storage: S,
	predictor: Option<Arc<dyn MatchPredictor>>,
	cascade_config: Option<CascadeConfig>,
	donors: Vec<Donor>,
	hospitals: Vec<Hospital>,
	patients: Vec<Patient>,
}

impl Default for LifelinkBuilder<MemoryStore> {
	fn default() -> Self {
		Self::new()
	}
}

impl LifelinkBuilder<MemoryStore> {
	/// Create a new builder with default memory storage
	pub fn new() -> Self {
		Self::with_storage(MemoryStore::new())
	}
}

impl<S> LifelinkBuilder<S>
where
	S: Storage + Clone + 'static,
{
	/// Create a new builder with the provided storage
	pub fn with_storage(storage: S) -> Self {
		Self {
			settings: None,
			storage,
			predictor: None,
			cascade_config: None,
			donors: Vec::new(),
			hospitals: Vec::new(),
			patients: Vec::new(),
		}
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Set a custom predictor adapter (replaces the HTTP predictor)
	pub fn with_predictor(mut self, predictor: Arc<dyn MatchPredictor>) -> Self {
		self.predictor = Some(predictor);
		self
	}

	/// Override the cascade deadlines (mainly for tests)
	pub fn with_cascade_config(mut self, config: CascadeConfig) -> Self {
		self.cascade_config = Some(config);
		self
	}

	/// Seed a donor into storage before start
	pub fn with_donor(mut self, donor: Donor) -> Self {
		self.donors.push(donor);
		self
	}

	/// Seed a hospital into storage before start
	pub fn with_hospital(mut self, hospital: Hospital) -> Self {
		self.hospitals.push(hospital);
		self
	}

	/// Seed a patient into storage before start
	pub fn with_patient(mut self, patient: Patient) -> Self {
		self.patients.push(patient);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	async fn seed_entities(&self) -> Result<(), Box<dyn std::error::Error>> {
		for donor in &self.donors {
			self.storage.create_donor(donor.clone()).await?;
		}
		for hospital in &self.hospitals {
			self.storage.create_hospital(hospital.clone()).await?;
		}
		for patient in &self.patients {
			self.storage.create_patient(patient.clone()).await?;
		}
		Ok(())
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(
		&self,
		settings: &Settings,
	) -> Result<(), Box<dyn std::error::Error>> {
		let log_level = &settings.logging.level;
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

		match settings.logging.format {
			LogFormat::Json => {
				let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
			LogFormat::Pretty => {
				let subscriber = tracing_subscriber::fmt()
					.pretty()
					.with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
			LogFormat::Compact => {
				let subscriber = tracing_subscriber::fmt()
					.compact()
					.with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
		}

		info!(
			"Logging configuration applied: level={}, format={:?}",
			settings.logging.level, settings.logging.format
		);
		Ok(())
	}

	/// Wire storage, predictor, hub and services, run the recovery sweep,
	/// and return the configured router with state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.clone().unwrap_or_default();
		self.seed_entities().await?;

		let storage: Arc<dyn Storage> = Arc::new(self.storage.clone());
		let predictor: Arc<dyn MatchPredictor> = match self.predictor {
			Some(predictor) => predictor,
			None => Arc::new(HttpPredictor::new(
				&settings.predictor.endpoint,
				settings.predictor.timeout_ms,
			)?),
		};

		let hub = Arc::new(ConnectionHub::new());
		let coordinator = Arc::new(ResponseCoordinator::new());
		let dispatcher = Arc::new(NotificationDispatcher::new(
			Arc::clone(&storage),
			Arc::clone(&hub),
		));

		let cascade_config = self.cascade_config.unwrap_or(CascadeConfig {
			offer_timeout: Duration::from_secs(settings.timeouts.offer_secs),
			..CascadeConfig::default()
		});
		let engine = Arc::new(CascadeEngine::new(
			Arc::clone(&storage),
			Arc::clone(&dispatcher),
			Arc::clone(&coordinator),
			cascade_config,
		));

		let matcher = Arc::new(MatcherService::new(
			Arc::clone(&storage),
			Arc::clone(&predictor),
		));
		let request_service = Arc::new(RequestService::new(
			Arc::clone(&storage),
			matcher,
			Arc::clone(&engine),
			Arc::clone(&dispatcher),
			Arc::clone(&coordinator),
		));
		let signal_router = Arc::new(SignalRouter::new(
			Arc::clone(&storage),
			Arc::clone(&coordinator),
			Arc::clone(&dispatcher),
		));

		// Crash tolerance: pick up every cascade the last process left open
		let recovery = RecoveryService::new(
			Arc::clone(&storage),
			Arc::clone(&engine),
			Arc::clone(&dispatcher),
		);
		let resumed = recovery.resume_pending().await?;
		if resumed > 0 {
			info!(resumed, "Recovery sweep resumed in-flight cascades");
		}

		storage.start_background_tasks().await?;

		let app_state = AppState {
			request_service,
			signal_router,
			dispatcher,
			hub,
			storage,
			predictor,
		};
		let router = create_router().with_state(app_state.clone());
		Ok((router, app_state))
	}

	/// Start the complete server with all defaults and setup
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		// Load .env file if it exists
		dotenvy::dotenv().ok();

		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config().unwrap_or_default(),
		};

		self.init_tracing_from_settings(&settings)?;

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;

		info!(
			predictor = %settings.predictor.endpoint,
			offer_timeout_secs = settings.timeouts.offer_secs,
			"Configuring lifelink server"
		);

		self.settings = Some(settings);
		let (app, _) = self.start().await?;

		let listener = tokio::net::TcpListener::bind(addr).await?;
		info!("Server listening on {}", bind_addr);
		info!("API endpoints available:");
		info!("  GET    /health");
		info!("  POST   /api/v1/requests");
		info!("  GET    /api/v1/requests/{{id}}");
		info!("  DELETE /api/v1/requests/{{id}}");
		info!("  GET    /api/v1/hospitals/{{id}}/requests");
		info!("  GET    /api/v1/hospitals/{{id}}/notifications");
		info!("  POST   /api/v1/hospitals/{{id}}/notifications/clear");
		info!("  GET    /api/v1/donors/{{id}}/offers");
		info!("  POST   /api/v1/donors/{{id}}/respond");
		info!("  GET    /api/v1/ws");

		axum::serve(listener, app).await?;
		Ok(())
	}
}
