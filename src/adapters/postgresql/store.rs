//! PostgreSQL record store

use crate::adapters::database::traits::RecordStore;
use crate::adapters::postgresql::client::PostgresClient;
use crate::config::schema::PostgreSQLConfig;
use crate::core::assembler::FeedbackRecord;
use crate::domain::{RecordId, Result, StorageError};
use async_trait::async_trait;
use tokio_postgres::error::SqlState;

const INSERT_RECORD: &str = "INSERT INTO feedback_records \
    (partition_key, row_key, schema_version, received_at, fields, passthrough) \
    VALUES ($1, $2, $3, $4, $5, $6)";

/// [`RecordStore`] backed by the `feedback_records` table
pub struct PostgresRecordStore {
    client: PostgresClient,
}

impl PostgresRecordStore {
    /// Build the store and its connection pool
    ///
    /// No connection is opened until the first operation.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        Ok(Self {
            client: PostgresClient::new(config)?,
        })
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &PostgresClient {
        &self.client
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn test_connection(&self) -> std::result::Result<(), StorageError> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> std::result::Result<(), StorageError> {
        self.client.ensure_schema().await
    }

    async fn store(&self, record: &FeedbackRecord) -> std::result::Result<RecordId, StorageError> {
        let fields = serde_json::to_value(&record.fields)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let passthrough = serde_json::Value::Object(record.passthrough.clone());
        let schema_version = i32::try_from(record.schema_version).map_err(|_| {
            StorageError::Serialization(format!(
                "schema_version {} out of range",
                record.schema_version
            ))
        })?;

        let conn = self.client.get_connection().await?;
        conn.execute(
            INSERT_RECORD,
            &[
                &record.id.partition_key.as_str(),
                &record.id.row_key.as_str(),
                &schema_version,
                &record.received_at,
                &fields,
                &passthrough,
            ],
        )
        .await
        .map_err(|e| map_insert_error(&record.id, e))?;

        Ok(record.id.clone())
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}

fn map_insert_error(id: &RecordId, err: tokio_postgres::Error) -> StorageError {
    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => StorageError::Conflict(id.to_string()),
        Some(code) if *code == SqlState::QUERY_CANCELED => {
            StorageError::Timeout(format!("Insert of {id} cancelled: {err}"))
        }
        _ => StorageError::InsertFailed(format!("Insert of {id} failed: {err}")),
    }
}
