//! Storage traits and error types

pub mod traits;

pub use traits::{
	DonorStorageTrait, HospitalStorageTrait, PatientStorageTrait, RequestStorageTrait,
	StorageError, StorageResult, StorageStats, StorageTrait,
};
