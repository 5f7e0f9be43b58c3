use axum::{
	routing::{get, post},
	Router,
};
use tower::ServiceBuilder;
use tower_http::{
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::handlers::{
	clear_hospital_notifications, delete_request, donor_respond, get_donor_offers,
	get_hospital_notifications, get_hospital_requests, get_request, health, post_request,
};
use crate::state::AppState;
use crate::ws::ws_gateway;

pub fn create_router() -> Router<AppState> {
	let cors = CorsLayer::permissive();
	let body_limit = RequestBodyLimitLayer::new(1024 * 1024);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	Router::new()
		.route("/health", get(health))
		.route("/health/", get(health))
		.route("/api/v1/requests", post(post_request))
		.route("/api/v1/requests/", post(post_request))
		.route("/api/v1/requests/{id}", get(get_request).delete(delete_request))
		.route("/api/v1/requests/{id}/", get(get_request).delete(delete_request))
		.route("/api/v1/hospitals/{id}/requests", get(get_hospital_requests))
		.route(
			"/api/v1/hospitals/{id}/notifications",
			get(get_hospital_notifications),
		)
		.route(
			"/api/v1/hospitals/{id}/notifications/clear",
			post(clear_hospital_notifications),
		)
		.route("/api/v1/donors/{id}/offers", get(get_donor_offers))
		.route("/api/v1/donors/{id}/respond", post(donor_respond))
		.route("/api/v1/ws", get(ws_gateway))
		.layer(cors)
		.layer(trace)
		.layer(req_id)
		.layer(body_limit)
}
