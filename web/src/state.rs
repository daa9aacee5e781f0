//! Application state for Axum handlers.

use reservation_core::{GreetingService, ReservationRepository, ReservationService};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Generic over the persistence backend, so the same router serves the
/// relational, document and in-memory stores.
pub struct AppState<R: ReservationRepository> {
    reservations: ReservationService<R>,
    greetings: GreetingService,
}

impl<R: ReservationRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            reservations: self.reservations.clone(),
            greetings: self.greetings.clone(),
        }
    }
}

impl<R: ReservationRepository> AppState<R> {
    /// Create a new application state.
    #[must_use]
    pub fn new(repository: Arc<R>, greetings: GreetingService) -> Self {
        Self {
            reservations: ReservationService::new(repository),
            greetings,
        }
    }

    /// The transactional save pipeline.
    #[must_use]
    pub const fn reservations(&self) -> &ReservationService<R> {
        &self.reservations
    }

    /// The repository behind the pipeline.
    #[must_use]
    pub fn repository(&self) -> &R {
        self.reservations.repository()
    }

    /// The greeting stream generator.
    #[must_use]
    pub const fn greetings(&self) -> &GreetingService {
        &self.greetings
    }
}
