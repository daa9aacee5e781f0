//! Reservation save pipeline.
//!
//! [`ReservationService::save_all`] turns a batch of names into persisted
//! reservations. The whole batch runs in one transaction and each name is
//! validated *after* it has been written, so one bad name rolls back every
//! write made for the batch:
//!
//! ```text
//! names ──► Reservation::new ──► tx.save ──► is_valid? ──► collect
//!                                               │
//!                                               └─ no ──► rollback, Validation error
//! ```

use crate::error::ReservationError;
use crate::model::Reservation;
use crate::repository::{ReservationRepository, ReservationTransaction, run_in_transaction};
use std::future::Future;
use std::sync::Arc;

/// Validates and persists reservations through a [`ReservationRepository`].
pub struct ReservationService<R> {
    repository: Arc<R>,
}

impl<R> Clone for ReservationService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> std::fmt::Debug for ReservationService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationService").finish_non_exhaustive()
    }
}

impl<R: ReservationRepository> ReservationService<R> {
    /// Creates a service writing through `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// The repository this service writes through.
    #[must_use]
    pub const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Whether a reservation's name starts with an uppercase letter.
    ///
    /// Uses the Unicode uppercase property, so accented capitals such as
    /// `É` pass. An empty name fails.
    #[must_use]
    pub fn is_valid(reservation: &Reservation<R::Id>) -> bool {
        reservation
            .name
            .chars()
            .next()
            .is_some_and(char::is_uppercase)
    }

    /// Save one reservation per name, in order, as one atomic batch.
    ///
    /// Returns the persisted reservations in input order, each carrying its
    /// store-assigned id. An empty input yields an empty vector.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::Validation`] if any persisted name does not start
    ///   with an uppercase letter. Every write of the batch is rolled back,
    ///   including those made before the offending name.
    /// - [`ReservationError::Storage`] if the backend fails; also rolls back.
    pub fn save_all<I>(
        &self,
        names: I,
    ) -> impl Future<Output = Result<Vec<Reservation<R::Id>>, ReservationError>> + Send + '_
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.save_names(names)
    }

    async fn save_names(
        &self,
        names: Vec<String>,
    ) -> Result<Vec<Reservation<R::Id>>, ReservationError> {
        let batch_size = names.len();

        let result = run_in_transaction(self.repository.as_ref(), move |tx| {
            Box::pin(async move {
                let mut saved = Vec::with_capacity(names.len());
                for name in names {
                    let persisted = tx.save(Reservation::new(name)).await?;
                    tracing::debug!(reservation = %persisted, "Reservation written");

                    if !Self::is_valid(&persisted) {
                        return Err(ReservationError::Validation {
                            name: persisted.name,
                        });
                    }
                    saved.push(persisted);
                }
                Ok(saved)
            })
        })
        .await;

        match &result {
            Ok(saved) => {
                metrics::counter!("reservation_batches_total", "outcome" => "committed")
                    .increment(1);
                metrics::counter!("reservations_saved_total").increment(saved.len() as u64);
                tracing::info!(count = saved.len(), "Reservation batch committed");
            }
            Err(ReservationError::Validation { name }) => {
                metrics::counter!("reservation_batches_total", "outcome" => "rejected")
                    .increment(1);
                tracing::warn!(
                    name = %name,
                    batch_size,
                    "Reservation batch rejected, rolled back"
                );
            }
            Err(ReservationError::Storage(err)) => {
                metrics::counter!("reservation_batches_total", "outcome" => "failed")
                    .increment(1);
                tracing::error!(error = %err, batch_size, "Reservation batch failed");
            }
        }

        result
    }
}

