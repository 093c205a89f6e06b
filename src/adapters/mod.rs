//! Record store backends.
//!
//! - [`database`] - [`RecordStore`](database::RecordStore) trait and backend factory
//! - [`memory`] - Process-local store for development and tests
//! - [`postgresql`] - PostgreSQL store with pooled connections
//!
//! The intake service holds an `Arc<dyn RecordStore>` chosen by
//! [`create_record_store`](database::create_record_store).

pub mod database;
pub mod memory;
pub mod postgresql;
