//! Module for database connection setup.
//!
//! Picks the `VoucherStore` implementation from configuration: a PostgreSQL
//! pool when `DATABASE_URL` is set, otherwise the in-memory store.

use std::sync::Arc;

use store::{MemoryStore, PgStore, StoreResult, VoucherStore};

use crate::config::AppConfig;

pub async fn init_store(config: &AppConfig) -> StoreResult<Arc<dyn VoucherStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.max_db_connections).await?;
            tracing::info!("using postgres voucher store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, vouchers are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
