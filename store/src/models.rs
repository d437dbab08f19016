//! Data models shared by every `VoucherStore` implementation.
//!
//! These are the persisted shapes of campaigns and vouchers, together with the
//! insert payloads and pagination types the HTTP layer passes through. JSON
//! serialization uses camelCase to match what the admin UI consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A marketing campaign that owns a set of voucher codes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub prefix: String,
    pub amount: f64,
    pub currency: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Validated payload for creating a campaign. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCampaign {
    pub prefix: String,
    pub amount: f64,
    pub currency: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl NewCampaign {
    pub(crate) fn into_campaign(self, id: Uuid, created_at: DateTime<Utc>) -> Campaign {
        Campaign {
            id,
            prefix: self.prefix,
            amount: self.amount,
            currency: self.currency,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: Uuid,
    pub code: String,
    pub campaign_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One-based page selection. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Returns `None` when either field is zero.
    pub fn new(page: u32, limit: u32) -> Option<Self> {
        (page >= 1 && limit >= 1).then_some(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPage {
    pub data: Vec<Voucher>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_rejects_zero() {
        assert!(PageRequest::new(0, 10).is_none());
        assert!(PageRequest::new(1, 0).is_none());
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::new(1, 50).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3, 100).unwrap().offset(), 200);
    }

    #[test]
    fn voucher_serializes_camel_case() {
        let voucher = Voucher {
            id: Uuid::nil(),
            code: "SPRING-ABC123".to_string(),
            campaign_id: Uuid::nil(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&voucher).unwrap();
        assert_eq!(json["campaignId"], Uuid::nil().to_string());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("campaign_id").is_none());
    }
}
