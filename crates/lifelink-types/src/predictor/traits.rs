//! Core predictor trait for user implementations

use async_trait::async_trait;
use std::fmt::Debug;

use super::PredictorResult;
use crate::matching::{FeatureVector, Prediction};

/// Contract for the external compatibility predictor
///
/// One call per eligible donor; a failed call is contained by the caller and
/// must never abort the batch.
#[async_trait]
pub trait MatchPredictor: Send + Sync + Debug {
	/// Human-readable adapter name, used in logs
	fn name(&self) -> &str;

	/// Score one feature vector; probability must be in [0, 1]
	async fn predict(&self, features: &FeatureVector) -> PredictorResult<Prediction>;

	/// Whether the predictor is reachable
	async fn health_check(&self) -> PredictorResult<bool>;
}
