//! Record model.
//!
//! [`Reservation`] is generic over its identifier because each backend picks
//! its own id scheme (auto-increment integers in `PostgreSQL`, UUID strings in
//! the document store). Nothing in the core inspects the id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored record pairing an opaque identifier with a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reservation<Id> {
    /// Store-assigned identifier, `None` until persisted.
    pub id: Option<Id>,
    /// Name the reservation was made under.
    pub name: String,
}

impl<Id> Reservation<Id> {
    /// Creates a transient reservation with no id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Creates a reservation that already carries an id.
    #[must_use]
    pub fn with_id(id: Id, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Returns `true` once a store has assigned an id.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl<Id: fmt::Display> fmt::Display for Reservation<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "Reservation(id={id}, name={})", self.name),
            None => write!(f, "Reservation(id=null, name={})", self.name),
        }
    }
}

/// Greeting request, built from the first text frame of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingRequest {
    /// Who to greet.
    pub name: String,
}

impl GreetingRequest {
    /// Creates a request for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One greeting emitted by the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingResponse {
    /// Formatted greeting text.
    pub message: String,
}
