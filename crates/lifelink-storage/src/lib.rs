//! Lifelink Storage
//!
//! Pluggable storage backends for the lifelink matching service.

pub mod memory_store;
pub mod traits;

pub use memory_store::MemoryStore;
pub use traits::{
	DonorStorage, HospitalStorage, PatientStorage, RequestStorage, Storage, StorageError,
	StorageResult,
};
