//! # Reservation Testing
//!
//! Testing utilities for the reservation service.
//!
//! This crate provides:
//! - An in-memory [`ReservationRepository`](reservation_core::ReservationRepository)
//!   with real transaction semantics and failure injection
//! - Deterministic [`Clock`] implementations
//! - Shared fixtures such as the demo seed names
//!
//! [`InMemoryReservationRepository`] is not test-only: the service binary
//! links this crate and runs it as the `memory` store backend.
//!
//! ## Example
//!
//! ```ignore
//! use reservation_testing::{InMemoryReservationRepository, SEED_NAMES};
//! use reservation_core::ReservationService;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_seed() {
//!     let repository = Arc::new(InMemoryReservationRepository::new());
//!     let service = ReservationService::new(repository.clone());
//!
//!     service.save_all(SEED_NAMES).await.unwrap();
//!     assert_eq!(repository.len(), 8);
//! }
//! ```

use chrono::{DateTime, Utc};
use reservation_core::environment::Clock;

pub mod repository_mocks;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reservation_testing::mocks::FixedClock;
    /// use reservation_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that moves forward by a fixed step on every reading.
    ///
    /// Gives distinct, predictable timestamps to consecutive greetings.
    ///
    /// # Example
    ///
    /// ```
    /// use reservation_testing::mocks::SteppingClock;
    /// use reservation_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let clock = SteppingClock::new(start, Duration::seconds(1));
    /// assert_eq!(clock.now(), start);
    /// assert_eq!(clock.now(), start + Duration::seconds(1));
    /// ```
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: chrono::Duration,
    }

    impl SteppingClock {
        /// Create a clock starting at `start`, advancing `step` per reading.
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let current = *next;
            *next = current + self.step;
            current
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test fixtures.
pub mod fixtures {
    /// Demo names the service seeds on startup.
    pub const SEED_NAMES: [&str; 8] = [
        "Josh", "Madhura", "Mark", "Olga", "Spencer", "Ria", "Stéphane", "Violetta",
    ];
}

// Re-export commonly used items
pub use fixtures::SEED_NAMES;
pub use mocks::{FixedClock, SteppingClock, test_clock};
pub use repository_mocks::{InMemoryReservationRepository, InMemoryTransaction};
