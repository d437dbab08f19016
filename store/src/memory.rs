//! In-memory implementation of `VoucherStore`.
//!
//! Used when the service runs without a database and as the backing store in
//! tests. It enforces the same invariants as the PostgreSQL schema: codes are
//! unique across campaigns and vouchers keep their insertion order.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::models::{Campaign, NewCampaign, PageRequest, Voucher, VoucherPage};
use crate::VoucherStore;

#[derive(Default)]
struct State {
    campaigns: Vec<Campaign>,
    /// Per campaign, in insertion order.
    vouchers: HashMap<Uuid, Vec<Voucher>>,
    codes: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoucherStore for MemoryStore {
    async fn create_campaign(&self, campaign: NewCampaign) -> StoreResult<Campaign> {
        let campaign = campaign.into_campaign(Uuid::new_v4(), Utc::now());
        self.state.write().await.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    async fn list_campaigns(&self) -> StoreResult<Vec<Campaign>> {
        Ok(self.state.read().await.campaigns.clone())
    }

    async fn get_campaign(&self, id: Uuid) -> StoreResult<Option<Campaign>> {
        let state = self.state.read().await;
        Ok(state.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn find_campaign_by_prefix(&self, prefix: &str) -> StoreResult<Option<Campaign>> {
        let state = self.state.read().await;
        Ok(state.campaigns.iter().find(|c| c.prefix == prefix).cloned())
    }

    async fn delete_campaign(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let Some(index) = state.campaigns.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        if let Some(vouchers) = state.vouchers.remove(&id) {
            for voucher in &vouchers {
                state.codes.remove(&voucher.code);
            }
            debug!("deleted campaign {id} ({} vouchers)", vouchers.len());
        }
        state.campaigns.remove(index);
        Ok(true)
    }

    async fn insert_vouchers(&self, campaign_id: Uuid, codes: &[String]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let State {
            campaigns,
            vouchers,
            codes: taken,
        } = &mut *state;

        if !campaigns.iter().any(|c| c.id == campaign_id) {
            debug!("ignoring {} vouchers for unknown campaign {campaign_id}", codes.len());
            return Ok(0);
        }

        let now = Utc::now();
        let list = vouchers.entry(campaign_id).or_default();
        let mut inserted = 0;
        for code in codes {
            if !taken.insert(code.clone()) {
                continue;
            }
            list.push(Voucher {
                id: Uuid::new_v4(),
                code: code.clone(),
                campaign_id,
                created_at: now,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn list_vouchers(&self, campaign_id: Uuid, page: PageRequest) -> StoreResult<VoucherPage> {
        let state = self.state.read().await;
        let all = state.vouchers.get(&campaign_id).map(Vec::as_slice).unwrap_or_default();

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let data = all
            .iter()
            .skip(offset)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(VoucherPage {
            data,
            total: all.len() as u64,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn all_vouchers(&self, campaign_id: Uuid) -> StoreResult<Vec<Voucher>> {
        let state = self.state.read().await;
        Ok(state.vouchers.get(&campaign_id).cloned().unwrap_or_default())
    }

    async fn delete_voucher(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let State {
            vouchers, codes, ..
        } = &mut *state;

        for list in vouchers.values_mut() {
            if let Some(index) = list.iter().position(|v| v.id == id) {
                let voucher = list.remove(index);
                codes.remove(&voucher.code);
                return Ok(true);
            }
        }
        Ok(false)
    }
}
