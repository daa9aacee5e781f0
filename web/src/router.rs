//! Router configuration for the reservation service.

use crate::handlers::{greetings, health_check, reservations};
use crate::state::AppState;
use axum::{Router, routing::get};
use reservation_core::ReservationRepository;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// # Routes
///
/// - `GET /health` - Liveness
/// - `GET /reservations` - List reservations
/// - `POST /reservations` - Save a batch of names
/// - `GET /ws/greetings` - Greeting websocket
pub fn build_router<R: ReservationRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/reservations",
            get(reservations::list::<R>).post(reservations::create::<R>),
        )
        .route("/ws/greetings", get(greetings::handle::<R>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
