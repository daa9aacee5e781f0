//! # Reservation Core
//!
//! Domain types and the two pieces of business logic behind the reservation
//! service.
//!
//! ## Contents
//!
//! - **Model**: [`Reservation`], [`GreetingRequest`], [`GreetingResponse`]
//! - **Persistence contract**: [`ReservationRepository`] and
//!   [`ReservationTransaction`], implemented by the storage backend crates
//! - **Save pipeline**: [`ReservationService::save_all`] validates and persists
//!   a batch of names inside one transaction
//! - **Greeting stream**: [`GreetingService::greet`] paces an endless stream of
//!   timestamped greetings
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────────────┐     ┌──────────────────────┐
//!  │  ReservationService  │     │   GreetingService    │
//!  │  (validate + save)   │     │  (paced stream)      │
//!  └──────────┬───────────┘     └──────────┬───────────┘
//!             │                            │
//!  ┌──────────▼───────────┐     ┌──────────▼───────────┐
//!  │ ReservationRepository│     │        Clock         │
//!  │  postgres/redis/mem  │     │  System / test       │
//!  └──────────────────────┘     └──────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use reservation_core::ReservationService;
//!
//! let service = ReservationService::new(repository.clone());
//! let saved = service.save_all(["Josh", "Madhura"]).await?;
//! assert!(saved.iter().all(|r| r.id.is_some()));
//! ```

pub mod environment;
pub mod error;
pub mod greeting;
pub mod model;
pub mod repository;
pub mod service;

pub use environment::{Clock, SystemClock};
pub use error::{ReservationError, StorageError};
pub use greeting::{DEFAULT_PACING_INTERVAL, GreetingService};
pub use model::{GreetingRequest, GreetingResponse, Reservation};
pub use repository::{ReservationRepository, ReservationTransaction, run_in_transaction};
pub use service::ReservationService;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
