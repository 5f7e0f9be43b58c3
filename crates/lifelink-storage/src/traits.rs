//! Storage traits for pluggable storage implementations

// Re-export the storage traits from types crate
pub use lifelink_types::storage::{
	DonorStorageTrait as DonorStorage, HospitalStorageTrait as HospitalStorage,
	PatientStorageTrait as PatientStorage, RequestStorageTrait as RequestStorage, StorageError,
	StorageResult, StorageTrait as Storage,
};
