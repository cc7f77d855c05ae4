//! Storage module for the API.
//!
//! Provides flow store backends for PostgreSQL and file-based storage.

pub mod error;
pub mod traits;

// Storage backend implementations
pub mod file;
pub mod postgres;

pub use error::StorageError;
pub use file::FileFlowStore;
pub use postgres::PostgresFlowStore;
pub use traits::FlowStore;
