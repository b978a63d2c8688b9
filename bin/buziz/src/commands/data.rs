//! Generic record collection commands.

use anyhow::Result;

use buziz_records::service::RecordsService;

use crate::config::Context;

pub fn list(ctx: &Context, office_id: &str, data_type: &str) -> Result<()> {
    let kv = crate::store::open(ctx)?;
    let service = RecordsService::new(kv);

    let records = service.list(office_id, data_type)?;
    if records.is_empty() {
        println!("No {data_type} records.");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

pub fn put(
    ctx: &Context,
    office_id: &str,
    data_type: &str,
    record_id: &str,
    json_body: &str,
    expected_version: Option<u64>,
) -> Result<()> {
    let data: serde_json::Value = serde_json::from_str(json_body)
        .map_err(|e| anyhow::anyhow!("invalid JSON body: {e}"))?;

    let kv = crate::store::open(ctx)?;
    let service = RecordsService::new(kv);

    let record = service.put(office_id, data_type, record_id, expected_version, data)?;
    println!("Wrote {data_type}/{record_id} at version {}.", record.version);
    Ok(())
}
