//! Batch commands against the record API.

use gbview_client::EnrichOptions;
use gbview_core::AppConfig;

use crate::{build_client, print_json};

/// Enriches `ids`, or every record with a panorama link when `ids` is empty.
///
/// Unavailable records are counted, not treated as errors. Only a batch-level
/// fault (invalid id, failed listing) fails the command.
pub(crate) async fn run_enrich(
    config: &AppConfig,
    ids: &[i64],
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let mut options = EnrichOptions::from_config(config);
    if let Some(concurrency) = concurrency {
        options = options.with_concurrency(concurrency);
    }

    let result = if ids.is_empty() {
        client.enrich_street_view(options).await?
    } else {
        client.enrich_ids(ids, options).await?
    };

    print_json(&result)?;
    eprintln!(
        "enriched {} records: {} renderable, {} unavailable",
        result.len(),
        result.renderable().count(),
        result.unavailable_count()
    );
    Ok(())
}

pub(crate) async fn run_markers(
    config: &AppConfig,
    filters: &[(String, String)],
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let records = client.map_markers(filters).await?;
    tracing::info!(markers = records.len(), "fetched map markers");
    print_json(&records)
}
