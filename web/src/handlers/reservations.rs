//! Reservation endpoints.

use crate::WebResult;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use reservation_core::{Reservation, ReservationRepository};
use serde::{Deserialize, Serialize};

/// Body of `POST /reservations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservations {
    /// Names to reserve, saved in order as one batch
    pub names: Vec<String>,
}

/// List every stored reservation.
///
/// # Endpoint
///
/// ```text
/// GET /reservations
/// ```
///
/// # Response
///
/// ```json
/// [{"id": 1, "name": "Josh"}, {"id": 2, "name": "Madhura"}]
/// ```
///
/// # Errors
///
/// Returns a 500 [`AppError`](crate::AppError) if the store cannot be read.
pub async fn list<R: ReservationRepository>(
    State(state): State<AppState<R>>,
) -> WebResult<Json<Vec<Reservation<R::Id>>>> {
    let all = state
        .repository()
        .find_all()
        .await
        .map_err(reservation_core::ReservationError::from)?;

    tracing::debug!(count = all.len(), "Listed reservations");
    Ok(Json(all))
}

/// Save a batch of names through the validating pipeline.
///
/// # Endpoint
///
/// ```text
/// POST /reservations
/// {"names": ["Olga", "Ria"]}
/// ```
///
/// # Errors
///
/// - 422 `VALIDATION_ERROR` if any name lacks a capital first letter; nothing
///   from the batch is stored
/// - 500 if the store fails
pub async fn create<R: ReservationRepository>(
    State(state): State<AppState<R>>,
    Json(request): Json<CreateReservations>,
) -> WebResult<(StatusCode, Json<Vec<Reservation<R::Id>>>)> {
    let saved = state.reservations().save_all(request.names).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
