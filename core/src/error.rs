//! Error types for the persistence contract and the save pipeline.

use thiserror::Error;

/// Errors raised by a storage backend.
///
/// Backends map their driver errors into these variants; the pipeline
/// propagates them unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Could not reach the store or obtain a connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement or command failed (constraint violation, syntax, ...).
    #[error("Database error: {0}")]
    Database(String),

    /// A stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors returned by [`ReservationService::save_all`](crate::ReservationService::save_all).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// A persisted name does not start with an uppercase letter.
    ///
    /// The whole batch this name belonged to has been rolled back.
    #[error("The name must have a capital first letter! (got {name:?})")]
    Validation {
        /// The offending name.
        name: String,
    },

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ReservationError {
    /// Returns `true` for [`ReservationError::Validation`].
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_offender() {
        let err = ReservationError::Validation {
            name: "josh".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"The name must have a capital first letter! (got "josh")"#
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: ReservationError = StorageError::Database("duplicate key".to_string()).into();
        assert_eq!(err.to_string(), "Database error: duplicate key");
        assert!(!err.is_validation());
    }
}
