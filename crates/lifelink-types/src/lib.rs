//! Lifelink Types
//!
//! Shared models and traits for the lifelink donation matching service.
//! This crate contains all domain models organized by business entity.

pub mod constants;
pub mod donors;
pub mod events;
pub mod hospitals;
pub mod matching;
pub mod patients;
pub mod predictor;
pub mod requests;
pub mod storage;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

// Re-export commonly used types for convenience
pub use requests::{
	AcceptedDonor, CreateRequestPayload, DonationRequest, DonorResponse, FinalOutcome,
	RankedDonor, RequestError, RequestResponse, RequestResult, RequestStatus,
	RequestValidationError, RequestValidationResult, ResponseOutcome, Urgency,
};

pub use donors::{
	BloodDonation, CurrentOffer, DonatedOrgan, DonationOffers, Donor, DonorError, DonorResult,
	MedicalDetails, PendingOffer, PersonalDetails,
};

pub use hospitals::{
	CascadeOutcome, DonationRecord, DonorSummary, Hospital, HospitalError, HospitalResult,
	OutcomeEntry,
};

pub use patients::Patient;

pub use events::{ChannelEvent, DonorAction, DonorSignal};

pub use matching::{FeatureVector, Prediction};

pub use predictor::{MatchPredictor, PredictorError, PredictorResult};

pub use storage::{
	DonorStorageTrait, HospitalStorageTrait, PatientStorageTrait, RequestStorageTrait,
	StorageError, StorageResult, StorageStats, StorageTrait,
};
