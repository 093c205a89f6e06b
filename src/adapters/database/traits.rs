//! Record store abstraction
//!
//! This module defines the trait that storage backends implement to receive
//! assembled feedback records.

use crate::core::assembler::FeedbackRecord;
use crate::domain::{RecordId, StorageError};
use async_trait::async_trait;

/// Append-only keyed store for feedback records
///
/// Implementations are shared across requests and must be `Send + Sync`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Test the connection to the backend
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    async fn test_connection(&self) -> Result<(), StorageError>;

    /// Create tables or other structures the store needs, if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Insert a record under its caller-supplied key
    ///
    /// Never overwrites: a record with the same key yields
    /// [`StorageError::Conflict`].
    async fn store(&self, record: &FeedbackRecord) -> Result<RecordId, StorageError>;

    /// Backend name for logs
    fn backend_name(&self) -> &str;
}
