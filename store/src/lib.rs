//! Core `store` crate for persisting voucher campaigns.
//!
//! This crate defines the `VoucherStore` trait, which outlines every persistence
//! operation the service needs, and provides the concrete implementations:
//! PostgreSQL for production and an in-memory store for local runs and tests.

pub mod errors;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use models::{Campaign, NewCampaign, PageRequest, Voucher, VoucherPage};
pub use postgres::PgStore;

/// Persistence operations for campaigns and their vouchers.
///
/// Voucher codes are unique across all campaigns. Inserts skip codes that
/// already exist instead of failing, and report how many rows were written.
#[async_trait]
pub trait VoucherStore: Send + Sync {
    async fn create_campaign(&self, campaign: NewCampaign) -> StoreResult<Campaign>;

    /// All campaigns, oldest first.
    async fn list_campaigns(&self) -> StoreResult<Vec<Campaign>>;

    async fn get_campaign(&self, id: Uuid) -> StoreResult<Option<Campaign>>;

    /// Oldest campaign with exactly this prefix.
    async fn find_campaign_by_prefix(&self, prefix: &str) -> StoreResult<Option<Campaign>>;

    /// Removes the campaign and all of its vouchers atomically.
    /// Returns `false` if no campaign had this id.
    async fn delete_campaign(&self, id: Uuid) -> StoreResult<bool>;

    /// Inserts one voucher per code, skipping codes that already exist
    /// (including duplicates inside `codes`). Returns the number inserted,
    /// which is zero when the campaign does not exist.
    async fn insert_vouchers(&self, campaign_id: Uuid, codes: &[String]) -> StoreResult<u64>;

    /// One page of a campaign's vouchers in insertion order.
    async fn list_vouchers(&self, campaign_id: Uuid, page: PageRequest) -> StoreResult<VoucherPage>;

    async fn all_vouchers(&self, campaign_id: Uuid) -> StoreResult<Vec<Voucher>>;

    async fn delete_voucher(&self, id: Uuid) -> StoreResult<bool>;
}
