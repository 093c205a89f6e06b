//! Record store factory
//!
//! Creates the configured backend. Availability is checked once, by the
//! intake service at startup.

use crate::adapters::database::traits::RecordStore;
use crate::adapters::memory::InMemoryStore;
use crate::adapters::postgresql::PostgresRecordStore;
use crate::config::schema::{StorageBackend, StorageConfig};
use crate::domain::{RedactorError, Result};
use std::sync::Arc;

/// Create a record store based on the configuration
///
/// # Errors
///
/// Returns an error if the backend cannot be created.
pub async fn create_record_store(config: &StorageConfig) -> Result<Arc<dyn RecordStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Creating in-memory record store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                RedactorError::Configuration(
                    "storage.postgresql configuration is required when storage.backend = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL record store");
            let store = PostgresRecordStore::new(pg_config.clone())?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend() {
        let store = create_record_store(&StorageConfig::default()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(store.test_connection().await.is_ok());
    }

    #[tokio::test]
    async fn test_postgresql_backend_requires_section() {
        let config = StorageConfig {
            backend: StorageBackend::PostgreSQL,
            postgresql: None,
        };
        assert!(matches!(
            create_record_store(&config).await,
            Err(RedactorError::Configuration(_))
        ));
    }
}
