//! In-memory reservation storage.
//!
//! Provides fast, deterministic storage that honours the same transaction
//! semantics as the real backends:
//! - [`InMemoryReservationRepository`]: `BTreeMap`-backed repository with
//!   auto-increment ids
//! - [`InMemoryTransaction`]: staged writes applied on commit
//!
//! Also serves as the `memory` backend of the service binary.

use reservation_core::model::Reservation;
use reservation_core::repository::{ReservationRepository, ReservationTransaction};
use reservation_core::StorageError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct Inner {
    rows: RwLock<BTreeMap<i64, String>>,
    next_id: AtomicI64,
    saves: AtomicUsize,
    fail_after: Option<usize>,
}

impl Inner {
    /// Hand out the id for a write and apply failure injection.
    fn prepare(&self, reservation: Reservation<i64>) -> Result<(i64, String), StorageError> {
        let attempt = self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| attempt >= limit) {
            return Err(StorageError::Database(format!(
                "injected failure on save #{}",
                attempt + 1
            )));
        }

        let id = match reservation.id {
            Some(id) => {
                self.next_id.fetch_max(id.saturating_add(1), Ordering::SeqCst);
                id
            }
            None => self
                .next_id
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
                .map_err(|_| {
                    StorageError::Database("reservation id sequence exhausted".to_string())
                })?,
        };
        Ok((id, reservation.name))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<i64, String>>, StorageError> {
        self.rows
            .write()
            .map_err(|_| StorageError::Database("reservation table lock poisoned".to_string()))
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<i64, String>>, StorageError> {
        self.rows
            .read()
            .map_err(|_| StorageError::Database("reservation table lock poisoned".to_string()))
    }
}

/// In-memory reservation repository for fast, deterministic testing.
///
/// Ids start at 1 and are never reused, even when the transaction that
/// claimed them rolls back (like a database sequence).
///
/// # Example
///
/// ```
/// use reservation_testing::InMemoryReservationRepository;
/// use reservation_core::{Reservation, ReservationRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = InMemoryReservationRepository::new();
/// let saved = repository.save(Reservation::new("Josh")).await?;
/// assert_eq!(saved.id, Some(1));
/// assert_eq!(repository.find_all().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryReservationRepository {
    inner: Arc<Inner>,
}

impl InMemoryReservationRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a repository whose saves fail once `successful_saves` saves
    /// have gone through.
    ///
    /// Counts saves made directly and inside transactions.
    #[must_use]
    pub fn failing_after(successful_saves: usize) -> Self {
        Self::build(Some(successful_saves))
    }

    fn build(fail_after: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                rows: RwLock::new(BTreeMap::new()),
                next_id: AtomicI64::new(1),
                saves: AtomicUsize::new(0),
                fail_after,
            }),
        }
    }

    /// Number of committed reservations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |rows| rows.len())
    }

    /// Check if no reservation is committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of save attempts so far, including failed and rolled back ones.
    #[must_use]
    pub fn save_attempts(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationRepository for InMemoryReservationRepository {
    type Id = i64;
    type Transaction = InMemoryTransaction;

    async fn save(&self, reservation: Reservation<i64>) -> Result<Reservation<i64>, StorageError> {
        let (id, name) = self.inner.prepare(reservation)?;
        self.inner.write()?.insert(id, name.clone());
        Ok(Reservation::with_id(id, name))
    }

    async fn find_all(&self) -> Result<Vec<Reservation<i64>>, StorageError> {
        Ok(self
            .inner
            .read()?
            .iter()
            .map(|(id, name)| Reservation::with_id(*id, name.clone()))
            .collect())
    }

    async fn delete_all(&self) -> Result<u64, StorageError> {
        let mut rows = self.inner.write()?;
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }

    async fn begin(&self) -> Result<InMemoryTransaction, StorageError> {
        Ok(InMemoryTransaction {
            inner: Arc::clone(&self.inner),
            staged: Vec::new(),
        })
    }
}

/// Transaction over an [`InMemoryReservationRepository`].
///
/// Writes are staged and only reach the shared table on commit.
#[derive(Debug)]
pub struct InMemoryTransaction {
    inner: Arc<Inner>,
    staged: Vec<(i64, String)>,
}

impl InMemoryTransaction {
    /// Number of writes waiting for commit.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

impl ReservationTransaction for InMemoryTransaction {
    type Id = i64;

    async fn save(
        &mut self,
        reservation: Reservation<i64>,
    ) -> Result<Reservation<i64>, StorageError> {
        let (id, name) = self.inner.prepare(reservation)?;
        self.staged.push((id, name.clone()));
        Ok(Reservation::with_id(id, name))
    }

    async fn commit(self) -> Result<(), StorageError> {
        let mut rows = self.inner.write()?;
        rows.extend(self.staged);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StorageError> {
        tracing::debug!(discarded = self.staged.len(), "In-memory transaction rolled back");
        Ok(())
    }
}
