//! Greeting stream generator.
//!
//! [`GreetingService::greet`] returns an endless stream that yields one
//! [`GreetingResponse`] per pacing interval. Each message is formatted at the
//! moment it is emitted, so two streams for the same name never produce the
//! same text.
//!
//! The stream owns its timer. Dropping it (for example when the websocket
//! session closes) cancels the timer; there is nothing else to clean up.

use crate::environment::Clock;
use crate::model::{GreetingRequest, GreetingResponse};
use async_stream::stream;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Default delay between two greetings.
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest pacing interval accepted; `tokio` timers reject a zero period.
const MIN_PACING_INTERVAL: Duration = Duration::from_millis(1);

/// Produces paced greeting streams.
#[derive(Clone)]
pub struct GreetingService {
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl std::fmt::Debug for GreetingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreetingService")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl GreetingService {
    /// Creates a service pacing at [`DEFAULT_PACING_INTERVAL`].
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_interval(clock, DEFAULT_PACING_INTERVAL)
    }

    /// Creates a service with a custom pacing interval.
    #[must_use]
    pub fn with_interval(clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            clock,
            interval: interval.max(MIN_PACING_INTERVAL),
        }
    }

    /// The delay between two emitted greetings.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Stream greetings for `request` forever.
    ///
    /// The first greeting arrives one interval after the stream is first
    /// polled. If the consumer falls behind, the next tick fires as soon as it
    /// polls again and later ticks are pushed back; ticks are never burst.
    pub fn greet(
        &self,
        request: GreetingRequest,
    ) -> impl Stream<Item = GreetingResponse> + Send + 'static {
        let clock = Arc::clone(&self.clock);
        let period = self.interval;

        stream! {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                yield GreetingResponse {
                    message: Self::message_for(&request.name, clock.now()),
                };
            }
        }
    }

    /// Format the greeting for `name` at instant `at`.
    ///
    /// ```
    /// use reservation_core::GreetingService;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    /// assert_eq!(
    ///     GreetingService::message_for("Josh", at),
    ///     "Hello Josh @ 2025-01-01T00:00:00.000000000Z"
    /// );
    /// ```
    #[must_use]
    pub fn message_for(name: &str, at: DateTime<Utc>) -> String {
        format!(
            "Hello {name} @ {}",
            at.to_rfc3339_opts(SecondsFormat::Nanos, true)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Advances one second per reading and counts readings.
    ///
    /// `reservation-testing` has the same clock, but it depends on this crate
    /// and implements the `Clock` of the non-test build, so unit tests here
    /// cannot use it.
    #[derive(Default)]
    struct SteppingClock {
        readings: AtomicI64,
    }

    impl SteppingClock {
        fn readings(&self) -> i64 {
            self.readings.load(Ordering::SeqCst)
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let step = self.readings.fetch_add(1, Ordering::SeqCst);
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(step)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_greetings_within_three_and_a_half_seconds() {
        let service = GreetingService::new(Arc::new(SteppingClock::default()));

        let responses: Vec<GreetingResponse> = service
            .greet(GreetingRequest::new("X"))
            .take_until(time::sleep(Duration::from_millis(3500)))
            .collect()
            .await;

        assert!(responses.len() >= 3, "got {} greetings", responses.len());
        for response in &responses {
            assert!(response.message.contains("Hello"));
            assert!(response.message.contains('X'));
        }
        for pair in responses.windows(2) {
            assert_ne!(pair[0].message, pair[1].message);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_greeting_waits_one_interval() {
        let service = GreetingService::new(Arc::new(SteppingClock::default()));
        let mut stream = Box::pin(service.greet(GreetingRequest::new("Josh")));

        let started = Instant::now();
        let first = stream.next().await.expect("stream never ends");

        assert!(started.elapsed() >= DEFAULT_PACING_INTERVAL);
        assert_eq!(first.message, "Hello Josh @ 2025-01-01T00:00:00.000000000Z");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_stream_stops_emission() {
        let clock = Arc::new(SteppingClock::default());
        let service = GreetingService::new(clock.clone());
        let mut stream = Box::pin(service.greet(GreetingRequest::new("Olga")));

        stream.next().await.expect("first");
        stream.next().await.expect("second");
        drop(stream);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(clock.readings(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_consumer_is_not_burst() {
        let service = GreetingService::new(Arc::new(SteppingClock::default()));
        let mut stream = Box::pin(service.greet(GreetingRequest::new("Mark")));

        stream.next().await.expect("first");
        time::sleep(Duration::from_millis(3500)).await;

        // The overdue tick fires immediately, the next one a full interval later.
        let overdue = Instant::now();
        stream.next().await.expect("second");
        assert!(overdue.elapsed() < Duration::from_millis(10));

        let resumed = Instant::now();
        stream.next().await.expect("third");
        assert!(resumed.elapsed() >= DEFAULT_PACING_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_interval() {
        let service = GreetingService::with_interval(
            Arc::new(SteppingClock::default()),
            Duration::from_millis(100),
        );
        assert_eq!(service.interval(), Duration::from_millis(100));

        let responses: Vec<GreetingResponse> = service
            .greet(GreetingRequest::new("Ria"))
            .take_until(time::sleep(Duration::from_millis(550)))
            .collect()
            .await;
        assert_eq!(responses.len(), 5);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let service =
            GreetingService::with_interval(Arc::new(SteppingClock::default()), Duration::ZERO);
        assert_eq!(service.interval(), MIN_PACING_INTERVAL);
    }
}
