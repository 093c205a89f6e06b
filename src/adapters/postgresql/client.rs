//! PostgreSQL client implementation
//!
//! Pooled connections to the record database, with TLS unless
//! `ssl_mode = "disable"`.

use crate::config::schema::PostgreSQLConfig;
use crate::config::secret::redact_connection_string;
use crate::domain::{RedactorError, Result, StorageError};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, PoolError, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::NoTls;

/// PostgreSQL client for the record store
///
/// Connections are created lazily; [`PostgresClient::test_connection`]
/// is the first call that touches the server.
pub struct PostgresClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgresClient {
    /// Create a new PostgreSQL client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the connection string does not parse,
    /// the TLS connector cannot be built, or the pool cannot be created.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_str()
            .parse()
            .map_err(|e| {
                RedactorError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
            })?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode(SslMode::Disable);
                Manager::from_config(pg_config, NoTls, mgr_config)
            }
            mode => {
                pg_config.ssl_mode(if mode == "require" {
                    SslMode::Require
                } else {
                    SslMode::Prefer
                });
                let connector = native_tls::TlsConnector::builder().build().map_err(|e| {
                    RedactorError::Configuration(format!("Failed to build TLS connector: {e}"))
                })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), mgr_config)
            }
        };

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                RedactorError::Configuration(format!("Failed to create connection pool: {e}"))
            })?;

        tracing::debug!(
            connection = %redact_connection_string(config.connection_string.expose_secret().as_str()),
            max_connections = config.max_connections,
            ssl_mode = %config.ssl_mode,
            "PostgreSQL pool created"
        );

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> std::result::Result<(), StorageError> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| StorageError::ConnectionFailed(format!("Connection test failed: {e}")))?;

        tracing::info!(
            connection = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Create the records table and indexes if they don't exist
    pub async fn ensure_schema(&self) -> std::result::Result<(), StorageError> {
        let client = self.get_connection().await?;

        let migration_sql = include_str!("../../../migrations/001_feedback_records.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| StorageError::SchemaFailed(format!("Failed to execute migration: {e}")))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a pooled connection with the configured statement timeout applied
    pub async fn get_connection(&self) -> std::result::Result<Object, StorageError> {
        let client = self.pool.get().await.map_err(map_pool_error)?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.batch_execute(&timeout_query).await.map_err(|e| {
            StorageError::ConnectionFailed(format!("Failed to set statement timeout: {e}"))
        })?;

        Ok(client)
    }

    /// Connection string with the password masked
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_str())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn map_pool_error(err: PoolError) -> StorageError {
    match err {
        PoolError::Timeout(kind) => {
            StorageError::Timeout(format!("Timed out waiting for a connection: {kind:?}"))
        }
        other => StorageError::ConnectionFailed(format!(
            "Failed to get connection from pool: {other}"
        )),
    }
}
