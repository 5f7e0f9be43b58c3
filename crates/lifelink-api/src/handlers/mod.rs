//! HTTP handlers

pub mod common;
pub mod donors;
pub mod health;
pub mod hospitals;
pub mod requests;

pub use donors::{donor_respond, get_donor_offers};
pub use health::health;
pub use hospitals::{clear_hospital_notifications, get_hospital_notifications};
pub use requests::{delete_request, get_hospital_requests, get_request, post_request};
