//! Seeds a large number of sequential vouchers into the configured database.
//!
//! `SEED_TOTAL` (default 100000) and `SEED_BATCH_SIZE` (default 1000) control
//! the volume. `DATABASE_URL` must point at PostgreSQL.

use std::error::Error;

use backend::config::{env_or, AppConfig};
use backend::services::seeder;
use store::PgStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    backend::init_tracing();

    let config = AppConfig::from_env()?;
    let Some(url) = config.database_url.as_deref() else {
        return Err("DATABASE_URL must be set to seed vouchers".into());
    };
    let total: u64 = env_or("SEED_TOTAL", 100_000)?;
    let batch_size: u64 = env_or("SEED_BATCH_SIZE", 1_000)?;

    tracing::info!(total, batch_size, "starting voucher seed");
    let store = PgStore::connect(url, config.max_db_connections).await?;
    let report = seeder::seed_vouchers(&store, total, batch_size).await?;

    tracing::info!(
        campaign = %report.campaign.id,
        inserted = report.inserted,
        "voucher seeding complete, total time: {} ms",
        report.elapsed.as_millis()
    );
    Ok(())
}
