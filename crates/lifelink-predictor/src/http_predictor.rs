//! HTTP adapter for the external compatibility predictor
//!
//! Posts one feature vector per call to `{endpoint}/predict` and expects a
//! `{ prediction, probability }` JSON body back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use lifelink_types::constants::limits::DEFAULT_PREDICTOR_TIMEOUT_MS;
use lifelink_types::matching::{FeatureVector, Prediction};
use lifelink_types::{MatchPredictor, PredictorError, PredictorResult};

/// Predictor adapter speaking the Flask predictor's wire format
#[derive(Debug)]
pub struct HttpPredictor {
	name: String,
	endpoint: Url,
	timeout_ms: u64,
	client: Client,
}

impl HttpPredictor {
	/// Create a new HTTP predictor against the given endpoint root
	pub fn new(endpoint: &str, timeout_ms: u64) -> PredictorResult<Self> {
		let endpoint = Url::parse(endpoint).map_err(|e| PredictorError::Endpoint {
			message: format!("'{}': {}", endpoint, e),
		})?;
		let client = Client::builder()
			.timeout(Duration::from_millis(timeout_ms))
			.build()
			.map_err(|e| PredictorError::Http {
				message: e.to_string(),
			})?;
		Ok(Self {
			name: "http-predictor".to_string(),
			endpoint,
			timeout_ms,
			client,
		})
	}

	/// Create a predictor with the default per-call timeout
	pub fn with_default_timeout(endpoint: &str) -> PredictorResult<Self> {
		Self::new(endpoint, DEFAULT_PREDICTOR_TIMEOUT_MS)
	}

	fn predict_url(&self) -> PredictorResult<Url> {
		self.endpoint
			.join("predict")
			.map_err(|e| PredictorError::Endpoint {
				message: e.to_string(),
			})
	}
}

#[async_trait]
impl MatchPredictor for HttpPredictor {
	fn name(&self) -> &str {
		&self.name
	}

	async fn predict(&self, features: &FeatureVector) -> PredictorResult<Prediction> {
		let url = self.predict_url()?;
		debug!(%url, ?features, "Requesting prediction");

		let response = self
			.client
			.post(url)
			.json(features)
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					PredictorError::Timeout {
						timeout_ms: self.timeout_ms,
					}
				} else {
					PredictorError::Http {
						message: e.to_string(),
					}
				}
			})?;

		if !response.status().is_success() {
			return Err(PredictorError::Http {
				message: format!("predictor returned status {}", response.status()),
			});
		}

		let prediction: Prediction =
			response
				.json()
				.await
				.map_err(|e| PredictorError::InvalidResponse {
					reason: e.to_string(),
				})?;

		if !(0.0..=1.0).contains(&prediction.probability) {
			return Err(PredictorError::ProbabilityOutOfRange {
				probability: prediction.probability,
			});
		}

		Ok(prediction)
	}

	async fn health_check(&self) -> PredictorResult<bool> {
		let response = self
			.client
			.get(self.endpoint.clone())
			.send()
			.await
			.map_err(|e| PredictorError::Http {
				message: e.to_string(),
			})?;
		// Any answer from the endpoint root counts as reachable
		Ok(response.status().as_u16() < 500)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_invalid_endpoint() {
		assert!(HttpPredictor::with_default_timeout("not a url").is_err());
	}

	#[test]
	fn builds_predict_url_from_endpoint_root() {
		let predictor = HttpPredictor::with_default_timeout("http://127.0.0.1:5001/").unwrap();
		assert_eq!(
			predictor.predict_url().unwrap().as_str(),
			"http://127.0.0.1:5001/predict"
		);
	}
}
