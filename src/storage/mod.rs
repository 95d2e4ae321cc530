pub mod postgres;
pub mod sqlite;
pub mod trait_def;


pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{PageRequest, Storage, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use std::sync::Arc;

/// Open the configured backend and make sure its schema exists
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        DatabaseBackend::Sqlite => {
            tracing::info!("Using SQLite storage: {}", config.url);
            Arc::new(SqliteStorage::new(&config.url, config.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL storage");
            Arc::new(PostgresStorage::new(&config.url, config.max_connections).await?)
        }
    };

    storage.init().await?;
    Ok(storage)
}
