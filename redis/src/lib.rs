//! Redis-based reservation repository.
//!
//! This crate provides the document-store variant of the
//! [`ReservationRepository`] contract.
//!
//! # Architecture
//!
//! Reservations are stored in Redis with:
//! - **Collection**: hash `{prefix}:reservations`
//! - **Field**: the reservation id, a random UUID v4 string
//! - **Value**: the reservation as a JSON document `{"id": .., "name": ..}`
//!
//! Transactions buffer documents in memory and flush them with one atomic
//! `MULTI`/`EXEC` pipeline on commit, so readers never see part of a batch.
//!
//! # Example
//!
//! ```no_run
//! use reservation_redis::{RedisConfig, RedisReservationRepository};
//! use reservation_core::{Reservation, ReservationRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = RedisReservationRepository::connect(&RedisConfig::default()).await?;
//! let saved = repository.save(Reservation::new("Josh")).await?;
//! println!("{saved}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use reservation_core::model::Reservation;
use reservation_core::repository::{ReservationRepository, ReservationTransaction};
use reservation_core::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
    /// Prefix for every key this repository touches
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "reservation-service".to_string(),
        }
    }
}

/// Redis-backed reservation repository storing JSON documents.
///
/// Ids are opaque UUID strings. `find_all` makes no ordering promise.
#[derive(Clone)]
pub struct RedisReservationRepository {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
    /// Key of the hash holding every reservation document.
    collection_key: String,
}

impl std::fmt::Debug for RedisReservationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisReservationRepository")
            .field("collection_key", &self.collection_key)
            .finish_non_exhaustive()
    }
}

impl RedisReservationRepository {
    /// Connect to Redis using `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the client cannot be created or
    /// the server is unreachable.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StorageError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            StorageError::Connection(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            StorageError::Connection(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!(key_prefix = %config.key_prefix, "Redis connection established");
        Ok(Self::from_connection(conn_manager, &config.key_prefix))
    }

    /// Wrap an existing connection manager.
    #[must_use]
    pub fn from_connection(conn_manager: ConnectionManager, key_prefix: &str) -> Self {
        Self {
            conn_manager,
            collection_key: collection_key(key_prefix),
        }
    }
}

impl ReservationRepository for RedisReservationRepository {
    type Id = String;
    type Transaction = RedisTransaction;

    async fn save(
        &self,
        reservation: Reservation<String>,
    ) -> Result<Reservation<String>, StorageError> {
        let started = Instant::now();
        let (document, json) = to_document(reservation)?;
        let id = document.id.clone().unwrap_or_default();

        let mut conn = self.conn_manager.clone();
        let _: () = conn
            .hset(&self.collection_key, &id, json)
            .await
            .map_err(storage_error)?;

        observe("save", started);
        Ok(document)
    }

    async fn find_all(&self) -> Result<Vec<Reservation<String>>, StorageError> {
        let started = Instant::now();
        let mut conn = self.conn_manager.clone();
        let documents: HashMap<String, String> = conn
            .hgetall(&self.collection_key)
            .await
            .map_err(storage_error)?;
        observe("find_all", started);

        documents
            .values()
            .map(|json| {
                serde_json::from_str(json).map_err(|e| {
                    StorageError::Serialization(format!("Failed to decode reservation: {e}"))
                })
            })
            .collect()
    }

    async fn delete_all(&self) -> Result<u64, StorageError> {
        let started = Instant::now();
        let mut conn = self.conn_manager.clone();
        let (removed,): (u64,) = redis::pipe()
            .atomic()
            .hlen(&self.collection_key)
            .del(&self.collection_key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(storage_error)?;
        observe("delete_all", started);

        Ok(removed)
    }

    async fn begin(&self) -> Result<RedisTransaction, StorageError> {
        Ok(RedisTransaction {
            conn_manager: self.conn_manager.clone(),
            collection_key: self.collection_key.clone(),
            staged: Vec::new(),
        })
    }
}

/// Transaction over a [`RedisReservationRepository`].
///
/// Documents are buffered until commit; dropping the transaction discards them.
pub struct RedisTransaction {
    conn_manager: ConnectionManager,
    collection_key: String,
    staged: Vec<(String, String)>,
}

impl std::fmt::Debug for RedisTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTransaction")
            .field("collection_key", &self.collection_key)
            .field("staged", &self.staged.len())
            .finish_non_exhaustive()
    }
}

impl ReservationTransaction for RedisTransaction {
    type Id = String;

    async fn save(
        &mut self,
        reservation: Reservation<String>,
    ) -> Result<Reservation<String>, StorageError> {
        let (document, json) = to_document(reservation)?;
        self.staged.push((document.id.clone().unwrap_or_default(), json));
        Ok(document)
    }

    async fn commit(self) -> Result<(), StorageError> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (id, json) in &self.staged {
            pipe.hset(&self.collection_key, id, json).ignore();
        }

        let mut conn = self.conn_manager;
        let _: () = pipe.query_async(&mut conn).await.map_err(storage_error)?;
        observe("commit", started);

        tracing::debug!(documents = self.staged.len(), "Redis transaction committed");
        Ok(())
    }

    async fn rollback(self) -> Result<(), StorageError> {
        tracing::debug!(discarded = self.staged.len(), "Redis transaction rolled back");
        Ok(())
    }
}

fn collection_key(prefix: &str) -> String {
    format!("{prefix}:reservations")
}

/// Assign an id if absent and encode the document.
fn to_document(
    mut reservation: Reservation<String>,
) -> Result<(Reservation<String>, String), StorageError> {
    if reservation.id.is_none() {
        reservation.id = Some(Uuid::new_v4().to_string());
    }
    let json = serde_json::to_string(&reservation)
        .map_err(|e| StorageError::Serialization(format!("Failed to encode reservation: {e}")))?;
    Ok((reservation, json))
}

fn observe(op: &'static str, started: Instant) {
    metrics::histogram!(
        "reservation_store_query_duration_seconds",
        "backend" => "redis",
        "op" => op
    )
    .record(started.elapsed().as_secs_f64());
}

fn storage_error(err: RedisError) -> StorageError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        StorageError::Connection(err.to_string())
    } else {
        StorageError::Database(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn test_collection_key() {
        assert_eq!(collection_key("demo"), "demo:reservations");
    }

    #[test]
    fn test_new_documents_get_uuid_ids() {
        let (document, json) = to_document(Reservation::new("Stéphane")).unwrap();
        let id = document.id.clone().expect("id assigned");

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(json, format!(r#"{{"id":"{id}","name":"Stéphane"}}"#));
    }

    #[test]
    fn test_existing_ids_are_kept() {
        let (document, _) = to_document(Reservation::with_id("abc".to_string(), "Ria")).unwrap();
        assert_eq!(document.id.as_deref(), Some("abc"));
    }
}
