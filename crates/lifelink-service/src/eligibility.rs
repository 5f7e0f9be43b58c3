//! Rule-based donor pre-screen
//!
//! Pure functions over the donor pool; no storage writes, no external calls.
//! Rules apply in order: consent, per-donor engagement, exact blood-group
//! equality, organ availability, blood-donation cooldown. A missing recipient
//! blood group excludes every donor (fail closed).

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use lifelink_types::constants::limits::BLOOD_COOLDOWN_DAYS;
use lifelink_types::Donor;

/// What a request needs from the pool
#[derive(Debug, Clone)]
pub struct EligibilityQuery<'a> {
	/// Requested organ; `None` means a blood request
	pub organ: Option<&'a str>,
	pub recipient_blood_group: Option<&'a str>,
}

/// Filter the pool down to donors that may be scored at all
pub fn filter_pool<'a>(
	donors: &'a [Donor],
	query: &EligibilityQuery<'_>,
	now: DateTime<Utc>,
) -> Vec<&'a Donor> {
	donors
		.iter()
		.filter(|donor| is_eligible(donor, query, now))
		.collect()
}

/// Whether one donor passes every rule for the query
pub fn is_eligible(donor: &Donor, query: &EligibilityQuery<'_>, now: DateTime<Utc>) -> bool {
	if !donor.consent {
		debug!(donor_id = %donor.donor_id, "Skipped: no consent");
		return false;
	}

	// A donor engaged with another request is invisible to new requests
	if donor.is_engaged() {
		debug!(donor_id = %donor.donor_id, "Skipped: engaged with another request");
		return false;
	}

	let Some(recipient_blood) = query.recipient_blood_group else {
		debug!(donor_id = %donor.donor_id, "Skipped: recipient blood group unknown");
		return false;
	};
	let Some(donor_blood) = donor.medical.blood_group.as_deref() else {
		debug!(donor_id = %donor.donor_id, "Skipped: donor blood group unknown");
		return false;
	};
	// Strict equality: no substitution or compatibility table
	if donor_blood != recipient_blood {
		debug!(
			donor_id = %donor.donor_id,
			donor_blood,
			recipient_blood,
			"Skipped: blood group not an exact match"
		);
		return false;
	}

	match query.organ {
		Some(organ) => {
			if !donor.offers_organ(organ) {
				debug!(donor_id = %donor.donor_id, organ, "Skipped: organ not offered");
				return false;
			}
			if donor.has_donated(organ) {
				debug!(donor_id = %donor.donor_id, organ, "Skipped: organ already donated");
				return false;
			}
			true
		},
		None => {
			if let Some(last) = donor.offers.blood.last_donation {
				if now - last < Duration::days(BLOOD_COOLDOWN_DAYS) {
					debug!(
						donor_id = %donor.donor_id,
						last_donation = %last,
						"Skipped: donated blood within the cooldown window"
					);
					return false;
				}
			}
			true
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;
	use lifelink_types::{
		BloodDonation, CurrentOffer, DonatedOrgan, DonationOffers, MedicalDetails,
		PersonalDetails, Urgency,
	};

	fn donor(donor_id: &str) -> Donor {
		Donor {
			donor_id: donor_id.to_string(),
			personal: PersonalDetails {
				first_name: "Asha".to_string(),
				last_name: "Rao".to_string(),
				age: 30,
				phone: "555-0101".to_string(),
				city: "Pune".to_string(),
			},
			medical: MedicalDetails {
				blood_group: Some("O+".to_string()),
			},
			offers: DonationOffers {
				blood: BloodDonation {
					agreed: true,
					last_donation: None,
				},
				living_organs: vec!["Kidney".to_string()],
				posthumous_organs: vec![],
			},
			donated_organs: vec![],
			consent: true,
			pending_offers: vec![],
			current_offer: None,
		}
	}

	fn organ_query() -> EligibilityQuery<'static> {
		EligibilityQuery {
			organ: Some("Kidney"),
			recipient_blood_group: Some("O+"),
		}
	}

	fn blood_query() -> EligibilityQuery<'static> {
		EligibilityQuery {
			organ: None,
			recipient_blood_group: Some("O+"),
		}
	}

	#[test]
	fn consenting_exact_match_donor_is_eligible() {
		assert!(is_eligible(&donor("d1"), &organ_query(), Utc::now()));
	}

	#[test]
	fn missing_recipient_blood_group_fails_closed() {
		let query = EligibilityQuery {
			organ: Some("Kidney"),
			recipient_blood_group: None,
		};
		assert!(!is_eligible(&donor("d1"), &query, Utc::now()));
	}

	#[test]
	fn blood_group_must_match_exactly() {
		let mut d = donor("d1");
		d.medical.blood_group = Some("O-".to_string());
		assert!(!is_eligible(&d, &organ_query(), Utc::now()));
	}

	#[test]
	fn withdrawn_consent_excludes_donor() {
		let mut d = donor("d1");
		d.consent = false;
		assert!(!is_eligible(&d, &organ_query(), Utc::now()));
	}

	#[test]
	fn engaged_donor_is_excluded() {
		let mut d = donor("d1");
		d.current_offer = Some(CurrentOffer {
			request_id: "other".to_string(),
			target: "Kidney".to_string(),
			urgency: Urgency::High,
			offered_at: Utc::now(),
		});
		assert!(!is_eligible(&d, &organ_query(), Utc::now()));
	}

	#[test]
	fn organ_must_be_offered_and_not_already_donated() {
		let mut d = donor("d1");
		d.offers.living_organs = vec!["Liver".to_string()];
		assert!(!is_eligible(&d, &organ_query(), Utc::now()));

		let mut d = donor("d2");
		d.donated_organs.push(DonatedOrgan {
			organ: "Kidney".to_string(),
			donated_at: Utc::now(),
		});
		assert!(!is_eligible(&d, &organ_query(), Utc::now()));
	}

	#[test]
	fn recent_blood_donation_is_excluded_for_blood_requests() {
		let now = Utc::now();
		let mut d = donor("d1");
		d.offers.blood.last_donation = Some(now - Duration::days(30));
		assert!(!is_eligible(&d, &blood_query(), now));

		// Past the cooldown the donor is eligible again
		d.offers.blood.last_donation = Some(now - Duration::days(91));
		assert!(is_eligible(&d, &blood_query(), now));

		// The cooldown does not apply to organ requests
		d.offers.blood.last_donation = Some(now - Duration::days(30));
		assert!(is_eligible(&d, &organ_query(), now));
	}

	#[test]
	fn filter_pool_keeps_only_eligible_donors() {
		let mut ineligible = donor("d2");
		ineligible.consent = false;
		let pool = vec![donor("d1"), ineligible];
		let eligible = filter_pool(&pool, &organ_query(), Utc::now());
		assert_eq!(eligible.len(), 1);
		assert_eq!(eligible[0].donor_id, "d1");
	}
}
