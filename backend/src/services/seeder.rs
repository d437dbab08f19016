//! Bulk seeding of sequential voucher codes for load testing.
//!
//! Attaches `VOUCHER-000001`, `VOUCHER-000002`, ... to a dedicated campaign,
//! creating that campaign on first use. Re-running the seeder is harmless:
//! codes that already exist are skipped by the store.

use std::time::{Duration, Instant};

use chrono::{TimeDelta, Utc};
use store::{Campaign, NewCampaign, StoreResult, VoucherStore};

pub const SEED_PREFIX: &str = "SEED-MASSIVE";

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub campaign: Campaign,
    pub inserted: u64,
    pub elapsed: Duration,
}

pub fn sequential_code(n: u64) -> String {
    format!("VOUCHER-{n:06}")
}

/// Returns the seed campaign and whether it was just created.
pub async fn seed_campaign(store: &dyn VoucherStore) -> StoreResult<(Campaign, bool)> {
    if let Some(campaign) = store.find_campaign_by_prefix(SEED_PREFIX).await? {
        return Ok((campaign, false));
    }
    let now = Utc::now();
    let campaign = store
        .create_campaign(NewCampaign {
            prefix: SEED_PREFIX.to_string(),
            amount: 20.0,
            currency: "USD".to_string(),
            valid_from: now,
            valid_to: now + TimeDelta::days(365),
        })
        .await?;
    Ok((campaign, true))
}

pub async fn seed_vouchers(store: &dyn VoucherStore, total: u64, batch_size: u64) -> StoreResult<SeedReport> {
    let started = Instant::now();
    let batch_size = batch_size.max(1);

    let (campaign, created) = seed_campaign(store).await?;
    if created {
        tracing::info!(campaign = %campaign.id, "created seed campaign");
    } else {
        tracing::info!(campaign = %campaign.id, "using existing seed campaign");
    }

    let mut inserted = 0;
    let mut start = 0;
    while start < total {
        let end = (start + batch_size).min(total);
        let codes: Vec<String> = (start + 1..=end).map(sequential_code).collect();
        inserted += store.insert_vouchers(campaign.id, &codes).await?;
        tracing::info!("Inserted {end}/{total}");
        start = end;
    }

    Ok(SeedReport {
        campaign,
        inserted,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    #[test]
    fn codes_are_zero_padded() {
        assert_eq!(sequential_code(1), "VOUCHER-000001");
        assert_eq!(sequential_code(100_000), "VOUCHER-100000");
    }

    #[tokio::test]
    async fn seeds_in_batches_and_is_idempotent() {
        let store = MemoryStore::new();

        let first = seed_vouchers(&store, 2_500, 1_000).await.unwrap();
        assert_eq!(first.inserted, 2_500);
        assert_eq!(first.campaign.prefix, SEED_PREFIX);

        let second = seed_vouchers(&store, 2_500, 1_000).await.unwrap();
        assert_eq!(second.campaign.id, first.campaign.id);
        assert_eq!(second.inserted, 0);

        let vouchers = store.all_vouchers(first.campaign.id).await.unwrap();
        assert_eq!(vouchers.len(), 2_500);
        assert_eq!(vouchers[0].code, "VOUCHER-000001");
        assert_eq!(vouchers[2_499].code, "VOUCHER-002500");
    }
}
