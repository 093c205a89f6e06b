//! PostgreSQL record store
//!
//! Stores feedback records in a single `feedback_records` table keyed by
//! partition and row key.

pub mod client;
pub mod store;

pub use client::PostgresClient;
pub use store::PostgresRecordStore;
