//! Lifelink Service
//!
//! Matching, cascade lifecycle and notification services: the eligibility
//! filter, the predictor-backed matcher, the request lifecycle controller,
//! the notification dispatcher and the response/timeout coordinator.

pub mod coordinator;
pub mod dispatch;
pub mod eligibility;
pub mod hub;
pub mod lifecycle;
pub mod matcher;
pub mod recovery;
pub mod requests;
pub mod signals;

pub use coordinator::{ConfirmAnswer, ConfirmWait, OfferAnswer, OfferWait, ResponseCoordinator};
pub use dispatch::NotificationDispatcher;
pub use hub::ConnectionHub;
pub use lifecycle::{CascadeConfig, CascadeEngine, CascadeError};
pub use matcher::{MatchQuery, MatcherService};
pub use recovery::RecoveryService;
pub use requests::{RequestService, RequestServiceError};
pub use signals::{SignalDisposition, SignalRouter};
