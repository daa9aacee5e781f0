//! # Reservation Service
//!
//! Wiring for the reservation demo: configuration, startup seeding and the
//! binary that serves the web adapters over the configured backend.
//!
//! ## Startup
//!
//! 1. Load `.env` and environment configuration ([`Config::from_env`])
//! 2. Connect the selected backend (memory, postgres or redis)
//! 3. Seed the demo names once ([`SampleDataInitializer::ready`])
//! 4. Serve HTTP and websockets until Ctrl+C or SIGTERM
//!
//! The `memory` backend is `reservation_testing::InMemoryReservationRepository`,
//! so this crate links `reservation-testing` as a normal dependency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod seed;

pub use config::{Config, ConfigError, DEFAULT_SEED_NAMES, StoreBackend};
pub use seed::SampleDataInitializer;
