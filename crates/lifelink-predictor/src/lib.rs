//! Lifelink Predictor
//!
//! Adapters for the external compatibility predictor service.

pub mod http_predictor;

pub use http_predictor::HttpPredictor;
pub use lifelink_types::{MatchPredictor, PredictorError, PredictorResult};
