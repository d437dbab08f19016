//! Validation of campaign creation requests.
//!
//! Every field is optional at the JSON level so that a missing field is
//! reported with the same message as an invalid one. The first failing check
//! wins.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use store::NewCampaign;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub prefix: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
}

impl CreateCampaignRequest {
    pub fn validate(self) -> Result<NewCampaign, String> {
        let prefix = self
            .prefix
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or("Prefix is required")?;

        let amount = self
            .amount
            .filter(|a| a.is_finite() && *a > 0.0)
            .ok_or("Amount must be greater than 0")?;

        let currency = self
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| c.len() == 3 && c.bytes().all(|b| b.is_ascii_alphabetic()))
            .ok_or("Currency must be a 3-letter code")?;

        let valid_from = parse_date(self.valid_from.as_deref(), "Start date")?;
        let valid_to = parse_date(self.valid_to.as_deref(), "End date")?;
        if valid_to < valid_from {
            return Err("End date cannot be before start date".to_string());
        }

        Ok(NewCampaign {
            prefix,
            amount,
            currency,
            valid_from,
            valid_to,
        })
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_date(raw: Option<&str>, label: &str) -> Result<DateTime<Utc>, String> {
    match raw.map(str::trim) {
        None | Some("") => Err(format!("{label} is required")),
        Some(value) => parse_timestamp(value).ok_or_else(|| format!("{label} is invalid")),
    }
}
