//! Record store abstraction layer
//!
//! This module provides a trait-based abstraction for storing feedback
//! records, allowing the service to write to different backends
//! (in-memory, PostgreSQL).

pub mod factory;
pub mod traits;

pub use factory::create_record_store;
pub use traits::RecordStore;
