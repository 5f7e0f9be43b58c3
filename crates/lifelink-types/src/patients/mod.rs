//! Patient domain model
//!
//! Read-only collaborator data; the core only consumes the matching
//! attributes (age, blood group).

use serde::{Deserialize, Serialize};

/// Core patient domain model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
	pub patient_id: String,
	pub name: String,
	pub age: u32,
	pub blood_group: Option<String>,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub phone: Option<String>,
}
