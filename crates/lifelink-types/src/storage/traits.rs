//! Storage traits for pluggable storage implementations
//!
//! The conditional mutations (`finalize_request`, `append_response`,
//! `try_reserve_donor`, `enqueue_offer`) are the concurrency seam: every
//! implementation must make them atomic with respect to the record they
//! touch, so single acceptance and per-donor exclusion hold without an
//! external lock.

use async_trait::async_trait;
use thiserror::Error;

use crate::donors::{CurrentOffer, Donor, PendingOffer};
use crate::hospitals::{DonationRecord, Hospital, OutcomeEntry};
use crate::patients::Patient;
use crate::requests::{DonationRequest, DonorResponse, FinalOutcome};

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("Item not found: {id}")]
	NotFound { id: String },
	#[error("Item already exists: {id}")]
	Duplicate { id: String },
	#[error("Connection error: {message}")]
	Connection { message: String },
	#[error("Serialization error: {message}")]
	Serialization { message: String },
	#[error("Storage operation failed: {message}")]
	Operation { message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Statistics about storage usage
#[derive(Debug, Clone)]
pub struct StorageStats {
	pub total_requests: usize,
	pub active_requests: usize,
	pub total_donors: usize,
	pub total_hospitals: usize,
}

/// Trait for donation request storage operations
#[async_trait]
pub trait RequestStorageTrait: Send + Sync {
	/// Add a new request to storage
	async fn create_request(&self, request: DonationRequest) -> StorageResult<()>;

	/// Get a request by ID
	async fn get_request(&self, request_id: &str) -> StorageResult<Option<DonationRequest>>;

	/// Remove a request by ID
	async fn remove_request(&self, request_id: &str) -> StorageResult<bool>;

	/// All requests raised by a hospital, newest first
	async fn get_requests_by_hospital(
		&self,
		hospital_id: &str,
	) -> StorageResult<Vec<DonationRequest>>;

	/// The active (non-finalized) request for a patient and target, if any
	async fn find_active_request(
		&self,
		patient_id: &str,
		target: &str,
	) -> StorageResult<Option<DonationRequest>>;

	/// All non-finalized requests, for the recovery sweep
	async fn get_unfinalized_requests(&self) -> StorageResult<Vec<DonationRequest>>;

	/// Advance the offer pointer. The stored index never decreases.
	async fn set_offer_index(&self, request_id: &str, index: usize) -> StorageResult<()>;

	/// Append a response log entry unless the request is already finalized.
	/// Returns whether the entry was appended.
	async fn append_response(
		&self,
		request_id: &str,
		response: DonorResponse,
	) -> StorageResult<bool>;

	/// Whether the request has been finalized
	async fn is_finalized(&self, request_id: &str) -> StorageResult<bool>;

	/// The one-time finalize transition: atomically sets the terminal
	/// outcome (and, for an acceptance, appends the accepted log entry).
	/// Returns false without mutating anything if another path already
	/// finalized the request.
	async fn finalize_request(
		&self,
		request_id: &str,
		outcome: FinalOutcome,
		response: Option<DonorResponse>,
	) -> StorageResult<bool>;

	/// Get request count
	async fn request_count(&self) -> StorageResult<usize>;
}

/// Trait for donor storage operations
#[async_trait]
pub trait DonorStorageTrait: Send + Sync {
	/// Add a new donor to storage
	async fn create_donor(&self, donor: Donor) -> StorageResult<()>;

	/// Get a donor by ID
	async fn get_donor(&self, donor_id: &str) -> StorageResult<Option<Donor>>;

	/// Update an existing donor
	async fn update_donor(&self, donor: Donor) -> StorageResult<()>;

	/// Remove a donor by ID
	async fn remove_donor(&self, donor_id: &str) -> StorageResult<bool>;

	/// The full donor pool, as the eligibility filter consumes it
	async fn get_all_donors(&self) -> StorageResult<Vec<Donor>>;

	/// Durably queue an offer unless one for the same request is already
	/// pending. Returns whether the offer was newly queued.
	async fn enqueue_offer(&self, donor_id: &str, offer: PendingOffer) -> StorageResult<bool>;

	/// Take and clear the donor's whole pending queue (connect-time drain)
	async fn drain_offers(&self, donor_id: &str) -> StorageResult<Vec<PendingOffer>>;

	/// Remove the pending offer for one request, if queued
	async fn clear_offer(&self, donor_id: &str, request_id: &str) -> StorageResult<bool>;

	/// Take the per-donor reservation. Fails (returns false) when the donor
	/// already holds an offer from a different request; re-reserving for the
	/// same request succeeds.
	async fn try_reserve_donor(&self, donor_id: &str, offer: CurrentOffer)
		-> StorageResult<bool>;

	/// Release the reservation if it belongs to the given request
	async fn release_donor(&self, donor_id: &str, request_id: &str) -> StorageResult<bool>;

	/// Record a completed donation: blood sets the last-donation date,
	/// organs are appended to the donated list.
	async fn record_donation(&self, donor_id: &str, organ: Option<&str>) -> StorageResult<()>;

	/// Get donor count
	async fn donor_count(&self) -> StorageResult<usize>;
}

/// Trait for hospital storage operations
#[async_trait]
pub trait HospitalStorageTrait: Send + Sync {
	/// Add a new hospital to storage
	async fn create_hospital(&self, hospital: Hospital) -> StorageResult<()>;

	/// Get a hospital by ID
	async fn get_hospital(&self, hospital_id: &str) -> StorageResult<Option<Hospital>>;

	/// Append an outcome to the durable log and the pending notifications
	async fn append_outcome(&self, hospital_id: &str, entry: OutcomeEntry) -> StorageResult<()>;

	/// Unacknowledged outcome notifications
	async fn get_pending_notifications(
		&self,
		hospital_id: &str,
	) -> StorageResult<Vec<OutcomeEntry>>;

	/// Acknowledge pending notifications: all of them, or only those for
	/// one request. Returns how many were cleared. The outcome log itself
	/// is untouched.
	async fn acknowledge_notifications(
		&self,
		hospital_id: &str,
		request_id: Option<&str>,
	) -> StorageResult<usize>;

	/// Record a completed donation in the hospital's history
	async fn append_donation_record(
		&self,
		hospital_id: &str,
		record: DonationRecord,
	) -> StorageResult<()>;

	/// Get hospital count
	async fn hospital_count(&self) -> StorageResult<usize>;
}

/// Trait for patient storage operations
#[async_trait]
pub trait PatientStorageTrait: Send + Sync {
	/// Add a new patient to storage
	async fn create_patient(&self, patient: Patient) -> StorageResult<()>;

	/// Get a patient by ID
	async fn get_patient(&self, patient_id: &str) -> StorageResult<Option<Patient>>;

	/// Get patient count
	async fn patient_count(&self) -> StorageResult<usize>;
}

/// Main storage trait that combines all storage operations
#[async_trait]
pub trait StorageTrait:
	RequestStorageTrait + DonorStorageTrait + HospitalStorageTrait + PatientStorageTrait
{
	/// Health check for the storage system
	async fn health_check(&self) -> StorageResult<bool>;

	/// Get overall storage statistics
	async fn stats(&self) -> StorageResult<StorageStats>;

	/// Close the storage connection
	async fn close(&self) -> StorageResult<()>;

	/// Start any background tasks associated with the storage
	/// implementation. Default implementation does nothing.
	async fn start_background_tasks(&self) -> StorageResult<()> {
		Ok(())
	}
}
