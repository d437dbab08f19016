//! PostgreSQL implementation of `VoucherStore`.
//!
//! Wraps an sqlx connection pool. The schema lives in `migrations/` and is
//! embedded into the binary, so `PgStore::connect` leaves the database ready
//! to use.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::models::{Campaign, NewCampaign, PageRequest, Voucher, VoucherPage};
use crate::VoucherStore;

const CAMPAIGN_COLUMNS: &str = "id, prefix, amount, currency, valid_from, valid_to, created_at";
const VOUCHER_COLUMNS: &str = "id, code, campaign_id, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Opens a pool against `url` and applies pending migrations.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!("connected to postgres (max_connections={max_connections})");

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl VoucherStore for PgStore {
    async fn create_campaign(&self, campaign: NewCampaign) -> StoreResult<Campaign> {
        let campaign = campaign.into_campaign(Uuid::new_v4(), Utc::now());
        sqlx::query(
            "INSERT INTO campaigns (id, prefix, amount, currency, valid_from, valid_to, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(campaign.id)
        .bind(&campaign.prefix)
        .bind(campaign.amount)
        .bind(&campaign.currency)
        .bind(campaign.valid_from)
        .bind(campaign.valid_to)
        .bind(campaign.created_at)
        .execute(&self.pool)
        .await?;
        Ok(campaign)
    }

    async fn list_campaigns(&self) -> StoreResult<Vec<Campaign>> {
        let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at, id");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_campaign(&self, id: Uuid) -> StoreResult<Option<Campaign>> {
        let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_campaign_by_prefix(&self, prefix: &str) -> StoreResult<Option<Campaign>> {
        let sql = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE prefix = $1 ORDER BY created_at, id LIMIT 1"
        );
        Ok(sqlx::query_as(&sql)
            .bind(prefix)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_campaign(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let vouchers = sqlx::query("DELETE FROM vouchers WHERE campaign_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let campaigns = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!("deleted campaign {id} ({vouchers} vouchers)");
        Ok(campaigns > 0)
    }

    async fn insert_vouchers(&self, campaign_id: Uuid, codes: &[String]) -> StoreResult<u64> {
        if codes.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = codes.iter().map(|_| Uuid::new_v4()).collect();

        let inserted = sqlx::query(
            "INSERT INTO vouchers (id, code, campaign_id, created_at) \
             SELECT t.id, t.code, $3, $4 FROM UNNEST($1::uuid[], $2::text[]) AS t(id, code) \
             WHERE EXISTS (SELECT 1 FROM campaigns WHERE id = $3) \
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(&ids)
        .bind(codes)
        .bind(campaign_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        debug!(
            "inserted {inserted}/{} vouchers for campaign {campaign_id}",
            codes.len()
        );
        Ok(inserted)
    }

    async fn list_vouchers(&self, campaign_id: Uuid, page: PageRequest) -> StoreResult<VoucherPage> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vouchers WHERE campaign_id = $1")
            .bind(campaign_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE campaign_id = $1 \
             ORDER BY seq LIMIT $2 OFFSET $3"
        );
        let data = sqlx::query_as(&sql)
            .bind(campaign_id)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(VoucherPage {
            data,
            total: total.max(0) as u64,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn all_vouchers(&self, campaign_id: Uuid) -> StoreResult<Vec<Voucher>> {
        let sql = format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE campaign_id = $1 ORDER BY seq");
        Ok(sqlx::query_as(&sql)
            .bind(campaign_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_voucher(&self, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM vouchers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
