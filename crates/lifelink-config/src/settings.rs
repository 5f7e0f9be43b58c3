//! Configuration settings structures

use serde::{Deserialize, Serialize};

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub predictor: PredictorSettings,
	pub timeouts: TimeoutSettings,
	pub logging: LoggingSettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

/// External predictor configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PredictorSettings {
	pub endpoint: String,
	/// Per-call timeout in milliseconds
	pub timeout_ms: u64,
}

/// Cascade timing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutSettings {
	/// Deadline for a donor to answer an offer, in seconds
	pub offer_secs: u64,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

/// Log output formats
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

impl Settings {
	/// Socket address string the server binds to
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			server: ServerSettings::default(),
			predictor: PredictorSettings::default(),
			timeouts: TimeoutSettings::default(),
			logging: LoggingSettings::default(),
		}
	}
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 5000,
		}
	}
}

impl Default for PredictorSettings {
	fn default() -> Self {
		Self {
			endpoint: "http://127.0.0.1:5001/".to_string(),
			timeout_ms: 5_000,
		}
	}
}

impl Default for TimeoutSettings {
	fn default() -> Self {
		Self { offer_secs: 600 }
	}
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Compact,
			structured: false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_documented_deadlines() {
		let settings = Settings::default();
		assert_eq!(settings.timeouts.offer_secs, 600);
		assert_eq!(settings.predictor.timeout_ms, 5_000);
		assert_eq!(settings.bind_address(), "0.0.0.0:5000");
	}
}
