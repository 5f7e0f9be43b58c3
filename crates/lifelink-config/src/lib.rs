//! Lifelink Config
//!
//! Configuration loading for the lifelink matching service.

pub mod loader;
pub mod settings;

pub use loader::load_config;
pub use settings::{
	LogFormat, LoggingSettings, PredictorSettings, ServerSettings, Settings, TimeoutSettings,
};
