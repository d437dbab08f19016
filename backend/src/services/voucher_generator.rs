//! Bulk voucher generation.
//!
//! Codes are generated in fixed-size batches and written through
//! `VoucherStore::insert_vouchers`. Uniqueness is left to the store: codes that
//! already exist are skipped, so the number created can fall short of the
//! number requested.

use std::sync::Arc;

use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use store::{Campaign, StoreResult, VoucherStore};
use tokio::sync::mpsc;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_SUFFIX_LEN: usize = 6;

/// Builds a code of the form `{prefix}-XXXXXX`.
pub fn random_code<R: Rng>(prefix: &str, rng: &mut R) -> String {
    let dist = Uniform::from(0..CODE_ALPHABET.len());
    let mut code = String::with_capacity(prefix.len() + 1 + CODE_SUFFIX_LEN);
    code.push_str(prefix);
    code.push('-');
    for _ in 0..CODE_SUFFIX_LEN {
        code.push(char::from(CODE_ALPHABET[rng.sample(dist)]));
    }
    code
}

/// Running totals reported after each batch.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub batch_created: u64,
    pub total_created: u64,
}

pub struct VoucherGenerator<R = StdRng> {
    store: Arc<dyn VoucherStore>,
    rng: R,
}

impl VoucherGenerator {
    pub fn new(store: Arc<dyn VoucherStore>) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }
}

impl<R: Rng> VoucherGenerator<R> {
    pub fn with_rng(store: Arc<dyn VoucherStore>, rng: R) -> Self {
        Self { store, rng }
    }

    /// Generates `count` codes for `campaign` in batches of `batch_size` and
    /// returns how many were inserted.
    ///
    /// When `progress` is given, a `Progress` is sent after every batch. If
    /// its receiver has been dropped, generation stops after the current batch.
    pub async fn generate(
        &mut self,
        campaign: &Campaign,
        count: u64,
        batch_size: usize,
        progress: Option<&mpsc::Sender<Progress>>,
    ) -> StoreResult<u64> {
        let batch_size = batch_size.max(1) as u64;
        let mut remaining = count;
        let mut total = 0;

        while remaining > 0 {
            let n = remaining.min(batch_size);
            let codes: Vec<String> = (0..n)
                .map(|_| random_code(&campaign.prefix, &mut self.rng))
                .collect();

            let inserted = self.store.insert_vouchers(campaign.id, &codes).await?;
            total += inserted;
            remaining -= n;

            if let Some(tx) = progress {
                let update = Progress {
                    batch_created: inserted,
                    total_created: total,
                };
                if tx.send(update).await.is_err() {
                    tracing::info!(
                        campaign = %campaign.id,
                        total,
                        remaining,
                        "progress receiver closed, stopping generation"
                    );
                    break;
                }
            }
        }

        tracing::info!(campaign = %campaign.id, requested = count, created = total, "generated vouchers");
        Ok(total)
    }
}
