//! Lifelink API
//!
//! HTTP API and realtime gateway for the lifelink matching service.

pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;

pub use router::create_router;
pub use state::AppState;
