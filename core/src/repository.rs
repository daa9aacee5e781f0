//! Persistence contract for reservations.
//!
//! This module defines the narrow storage abstraction the save pipeline and
//! the HTTP handlers depend on. It exposes exactly three operations plus a
//! transaction handle:
//!
//! - `save`: persist one reservation, assigning an id if absent
//! - `find_all`: read every stored reservation
//! - `delete_all`: remove every stored reservation
//! - `begin`: open a [`ReservationTransaction`]
//!
//! # Implementations
//!
//! - `PostgresReservationRepository` (in `reservation-postgres`): `BIGSERIAL` ids
//! - `RedisReservationRepository` (in `reservation-redis`): JSON documents, UUID ids
//! - `InMemoryReservationRepository` (in `reservation-testing`): tests and local runs
//!
//! # Transactions
//!
//! Writes made through a transaction are invisible to [`ReservationRepository::find_all`]
//! until [`ReservationTransaction::commit`] and are discarded by
//! [`ReservationTransaction::rollback`]. Dropping a transaction without
//! committing it rolls it back. Use [`run_in_transaction`] rather than driving
//! the handle by hand.

use crate::error::{ReservationError, StorageError};
use crate::model::Reservation;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display};
use std::future::Future;

/// Storage abstraction for reservation records.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; handlers share one instance behind
/// an `Arc`.
pub trait ReservationRepository: Send + Sync {
    /// Opaque identifier assigned by the store.
    type Id: Clone + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Transaction handle returned by [`begin`](Self::begin).
    type Transaction: ReservationTransaction<Id = Self::Id>;

    /// Persist a reservation outside any explicit transaction.
    ///
    /// Assigns an id when `reservation.id` is `None`; otherwise overwrites the
    /// record with that id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    fn save(
        &self,
        reservation: Reservation<Self::Id>,
    ) -> impl Future<Output = Result<Reservation<Self::Id>, StorageError>> + Send;

    /// Load every committed reservation.
    ///
    /// Ordering is backend specific.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the read fails.
    fn find_all(&self)
    -> impl Future<Output = Result<Vec<Reservation<Self::Id>>, StorageError>> + Send;

    /// Remove every reservation, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the delete fails.
    fn delete_all(&self) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// Open a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if no connection could be obtained.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, StorageError>> + Send;
}

/// A unit of work over a [`ReservationRepository`].
pub trait ReservationTransaction: Send {
    /// Identifier type of the owning repository.
    type Id;

    /// Persist a reservation inside this transaction, assigning an id if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    fn save(
        &mut self,
        reservation: Reservation<Self::Id>,
    ) -> impl Future<Output = Result<Reservation<Self::Id>, StorageError>> + Send;

    /// Make every write of this transaction visible.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the commit fails; nothing is applied in that case.
    fn commit(self) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Discard every write of this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend reports a failure while aborting.
    fn rollback(self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Run `work` inside one transaction.
///
/// Commits when `work` returns `Ok` and rolls back on any `Err`. A failing
/// rollback is logged; the error from `work` is what the caller sees.
///
/// # Errors
///
/// Returns the error produced by `work`, or [`ReservationError::Storage`] if
/// the transaction could not be opened or committed.
///
/// # Example
///
/// ```ignore
/// let saved = run_in_transaction(&repository, |tx| {
///     Box::pin(async move { Ok(tx.save(Reservation::new("Josh")).await?) })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<R, T, F>(repository: &R, work: F) -> Result<T, ReservationError>
where
    R: ReservationRepository,
    F: for<'t> FnOnce(&'t mut R::Transaction) -> BoxFuture<'t, Result<T, ReservationError>>
        + Send,
    T: Send,
{
    let mut tx = repository.begin().await?;

    match work(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            tracing::debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    error = %rollback_err,
                    cause = %err,
                    "Failed to roll back transaction"
                );
            } else {
                tracing::debug!(cause = %err, "Transaction rolled back");
            }
            Err(err)
        }
    }
}
