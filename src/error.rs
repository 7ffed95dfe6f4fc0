//! Error types for the state container.

use thiserror::Error;

/// Main error type for state operations.
///
/// The container's core operations (`update`, `subscribe`, `unsubscribe`)
/// never fail; only the typed read accessor can return an error.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Deserialization(e.to_string())
    }
}

/// Result type for state operations.
pub type Result<T> = std::result::Result<T, StateError>;
