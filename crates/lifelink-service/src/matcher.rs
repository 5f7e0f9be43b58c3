//! Donor matching: eligibility filter, concurrent scoring, ranking
//!
//! One predictor call per eligible donor, fanned out concurrently. A single
//! donor's scoring failure is logged and excluded; it never aborts the batch.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use lifelink_storage::{DonorStorage, Storage};
use lifelink_types::constants::limits::{MAX_RANKED_DONORS, SCORE_THRESHOLD};
use lifelink_types::matching::FeatureVector;
use lifelink_types::storage::StorageResult;
use lifelink_types::{Donor, MatchPredictor, RankedDonor, Urgency};

use crate::eligibility::{self, EligibilityQuery};

/// Matching inputs taken from the request, its patient and its hospital
#[derive(Debug, Clone)]
pub struct MatchQuery {
	/// Requested organ; `None` means a blood request
	pub organ: Option<String>,
	pub patient_age: u32,
	pub recipient_blood_group: Option<String>,
	pub hospital_city: String,
	pub urgency: Urgency,
}

/// Service producing the frozen ranked candidate list for a new request
pub struct MatcherService {
	storage: Arc<dyn Storage>,
	predictor: Arc<dyn MatchPredictor>,
}

impl MatcherService {
	pub fn new(storage: Arc<dyn Storage>, predictor: Arc<dyn MatchPredictor>) -> Self {
		Self { storage, predictor }
	}

	/// Filter, score and rank the donor pool for one request.
	///
	/// The returned list is what gets frozen onto the request: sorted by
	/// ascending age distance to the patient (stable on batch order) and
	/// truncated to the ranking limit.
	pub async fn rank_donors(&self, query: &MatchQuery) -> StorageResult<Vec<RankedDonor>> {
		let pool = self.storage.get_all_donors().await?;
		let eligibility = EligibilityQuery {
			organ: query.organ.as_deref(),
			recipient_blood_group: query.recipient_blood_group.as_deref(),
		};
		let eligible: Vec<Donor> = eligibility::filter_pool(&pool, &eligibility, chrono::Utc::now())
			.into_iter()
			.cloned()
			.collect();

		info!(
			eligible = eligible.len(),
			pool = pool.len(),
			"Eligibility filter complete"
		);

		let tasks = eligible.into_iter().map(|donor| {
			let features = FeatureVector::build(
				&donor,
				query.patient_age,
				query.organ.as_deref(),
				query.urgency,
				&query.hospital_city,
			);
			let predictor = Arc::clone(&self.predictor);

			tokio::spawn(async move {
				match predictor.predict(&features).await {
					Ok(prediction) if prediction.probability > SCORE_THRESHOLD => {
						debug!(
							donor_id = %donor.donor_id,
							probability = prediction.probability,
							"Donor passed the score threshold"
						);
						Some((donor, prediction.probability))
					},
					Ok(prediction) => {
						debug!(
							donor_id = %donor.donor_id,
							probability = prediction.probability,
							"Donor below the score threshold"
						);
						None
					},
					Err(e) => {
						// Contained per donor; the batch continues
						warn!(donor_id = %donor.donor_id, error = %e, "Prediction failed");
						None
					},
				}
			})
		});

		let results = join_all(tasks).await;
		let mut scored: Vec<(Donor, f64)> = results
			.into_iter()
			.filter_map(|r| r.ok().flatten())
			.collect();

		// Stable sort keeps batch order between equal age distances
		scored.sort_by_key(|(donor, _)| donor.personal.age.abs_diff(query.patient_age));
		scored.truncate(MAX_RANKED_DONORS);

		let ranked: Vec<RankedDonor> = scored
			.into_iter()
			.map(|(donor, score)| RankedDonor {
				donor_id: donor.donor_id.clone(),
				name: donor.full_name(),
				age: donor.personal.age,
				city: donor.personal.city.clone(),
				blood_group: donor
					.medical
					.blood_group
					.clone()
					.unwrap_or_else(|| "Unknown".to_string()),
				score,
			})
			.collect();

		info!(ranked = ranked.len(), "Ranking complete");
		Ok(ranked)
	}
}
