//! Injected dependencies.
//!
//! The greeting stream reads wall-clock time through [`Clock`] so tests can
//! substitute a deterministic source.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Example
///
/// ```
/// use reservation_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let earlier = clock.now();
/// assert!(clock.now() >= earlier);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
