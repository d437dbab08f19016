//! Custom error types specific to the `store` crate.
//!
//! Every `VoucherStore` implementation reports failures through `StoreError`,
//! so callers handle database and migration problems in one place.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;
