//! Art-visibility browsing: postcodes with panoramas and the records in one
//! postcode together with their visibility flag.

use anyhow::Context;
use gbview_core::{AppConfig, Record};

use crate::{build_client, print_json};

pub(crate) async fn run_zipcodes(config: &AppConfig) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let zipcodes = client
        .list_zipcodes()
        .await
        .context("failed to list postcodes")?;
    print_json(&zipcodes)
}

pub(crate) async fn run_zip(
    config: &AppConfig,
    zipcode: &str,
    visible_only: bool,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let records = client
        .records_by_zip(zipcode)
        .await
        .with_context(|| format!("failed to fetch records for postcode {zipcode}"))?;

    let total = records.len();
    let records = filter_visible(records, visible_only);
    tracing::info!(zipcode, total, shown = records.len(), "fetched postcode records");
    print_json(&records)
}

/// With `visible_only`, keeps records explicitly flagged visible; an
/// unreported flag counts as not visible.
fn filter_visible(records: Vec<Record>, visible_only: bool) -> Vec<Record> {
    if !visible_only {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.art_visible == Some(true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(id: i64, art_visible: Option<bool>) -> Record {
        let mut r = Record::with_id(id);
        r.art_visible = art_visible;
        r
    }

    #[test]
    fn visible_only_keeps_flagged_records() {
        let records = vec![flagged(1, Some(true)), flagged(2, Some(false)), flagged(3, None)];
        let ids: Vec<i64> = filter_visible(records, true).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn without_filter_all_records_are_kept() {
        let records = vec![flagged(1, Some(true)), flagged(2, None)];
        assert_eq!(filter_visible(records, false).len(), 2);
    }
}
