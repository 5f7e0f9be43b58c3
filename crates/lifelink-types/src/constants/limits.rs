//! Global limits and defaults for matching and cascade timing

/// Maximum number of ranked candidates frozen onto a request
pub const MAX_RANKED_DONORS: usize = 5;

/// Minimum predictor probability for a donor to enter the ranking
pub const SCORE_THRESHOLD: f64 = 0.4;

/// Days a donor is ineligible for blood requests after a blood donation
pub const BLOOD_COOLDOWN_DAYS: i64 = 90;

/// Default deadline for a donor to answer an offer, in seconds
pub const DEFAULT_OFFER_TIMEOUT_SECS: u64 = 600;

/// Fixed deadline for the acceptance confirmation handshake, in seconds
pub const CONFIRM_TIMEOUT_SECS: u64 = 60;

/// Default timeout for a single predictor call, in milliseconds
pub const DEFAULT_PREDICTOR_TIMEOUT_MS: u64 = 5_000;
