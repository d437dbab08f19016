//! CSV rendering of a campaign's vouchers.

use csv::Writer;
use serde::Serialize;
use store::Voucher;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Row<'a> {
    id: Uuid,
    code: &'a str,
    campaign_id: Uuid,
}

/// Renders `id,code,campaignId` with a header row.
pub fn vouchers_to_csv(vouchers: &[Voucher]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());
    for voucher in vouchers {
        writer.serialize(Row {
            id: voucher.id,
            code: &voucher.code,
            campaign_id: voucher.campaign_id,
        })?;
    }
    writer.into_inner().map_err(|err| err.into_error().into())
}

pub fn attachment_filename(campaign_id: Uuid) -> String {
    format!("vouchers_{campaign_id}.csv")
}
