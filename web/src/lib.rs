//! Axum adapters for the reservation service.
//!
//! The core crate knows nothing about HTTP. This crate maps it onto:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          Imperative Shell (Axum)         │  ← HTTP, JSON, websockets
//! │  - GET/POST /reservations                │  ← Request tracing
//! │  - GET /ws/greetings                     │
//! ├──────────────────────────────────────────┤
//! │          reservation-core                │
//! │  - ReservationService (save pipeline)    │
//! │  - GreetingService (paced stream)        │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use reservation_web::{AppState, build_router};
//!
//! let state = AppState::new(repository, GreetingService::new(Arc::new(SystemClock)));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, build_router(state)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use handlers::reservations::CreateReservations;
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
