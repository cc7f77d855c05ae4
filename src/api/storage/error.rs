//! Storage error types for the flow store backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageError {
    /// Entity not found (or owned by someone else)
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// The user already keeps the maximum number of flows
    #[error("Flow limit of {limit} reached")]
    QuotaExceeded { limit: usize },
    /// Database connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    pub fn flow_not_found(flow_id: impl ToString) -> Self {
        StorageError::NotFound {
            entity_type: "flow".to_string(),
            entity_id: flow_id.to_string(),
        }
    }
}
