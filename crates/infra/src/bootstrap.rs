//! Store wiring for process edges.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::{InventoryConfig, StoreBackend};
use crate::store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore};

/// Build the store selected by `config`, installing the Postgres schema when needed.
pub async fn connect_store(config: &InventoryConfig) -> anyhow::Result<Arc<dyn InventoryStore>> {
    match &config.backend {
        StoreBackend::InMemory => {
            info!(backend = "in_memory", "inventory store ready");
            Ok(Arc::new(InMemoryInventoryStore::new()))
        }
        StoreBackend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(8)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;

            let store = PostgresInventoryStore::new(pool);
            store
                .install_schema()
                .await
                .context("failed to install inventory schema")?;

            info!(backend = "postgres", "inventory store ready");
            Ok(Arc::new(store))
        }
    }
}
