//! Single-record commands: parse a link, resolve one record, build an
//! embed link.

use anyhow::Context;
use gbview_core::{
    build_embed_url, correct_zoom, parse_for_storage, parse_reference, resolve, AppConfig,
    PaneDimensions, StoredView,
};
use serde_json::json;

use crate::{build_client, print_json};

pub(crate) fn run_parse(reference: &str) -> anyhow::Result<()> {
    let parsed = parse_reference(reference)
        .with_context(|| format!("no view parameters found in \"{reference}\""))?;
    print_json(&parsed)
}

pub(crate) fn run_embed(reference: &str, api_key: Option<&str>) -> anyhow::Result<()> {
    let stored = parse_for_storage(reference);
    let embed_url = build_embed_url(&stored, api_key);
    if embed_url.is_none() {
        tracing::warn!(
            has_key = api_key.is_some(),
            has_position = stored.latitude.is_some() && stored.longitude.is_some(),
            "no embed link built"
        );
    }
    print_json(&json!({
        "stored": stored,
        "embed_url": embed_url,
    }))
}

/// Fetches `id`, resolves its viewpoint and, when pane dimensions are given,
/// corrects the zoom for the reduced pane.
pub(crate) async fn run_resolve(
    config: &AppConfig,
    id: i64,
    dims: Option<PaneDimensions>,
    embed: bool,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let record = client
        .record_by_id(id)
        .await
        .with_context(|| format!("failed to fetch record {id}"))?;

    let viewpoint = resolve(&record)
        .with_context(|| format!("record {id} has no resolvable position"))?;

    let pane_zoom = display_zoom(viewpoint.zoom_level, dims);

    let embed_url = if embed {
        build_embed_url(
            &StoredView::from_viewpoint(&viewpoint),
            config.google_maps_api_key.as_deref(),
        )
    } else {
        None
    };

    tracing::debug!(id, zoom_level = viewpoint.zoom_level, "resolved viewpoint");
    print_json(&json!({
        "record": record,
        "viewpoint": viewpoint,
        "display_zoom_level": pane_zoom,
        "embed_url": embed_url,
    }))
}

/// Zoom to render with in a pane of the given size, if one was given.
fn display_zoom(zoom_level: f64, dims: Option<PaneDimensions>) -> Option<f64> {
    dims.map(|dims| correct_zoom(zoom_level, dims.pane_height_px, dims.full_height_px))
}
