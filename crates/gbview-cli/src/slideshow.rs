//! Random view and timed slideshow over the map markers.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use gbview_core::{pick_random, resolve, AppConfig, Record, Slideshow, SlideshowEntry};
use serde_json::json;

use crate::{build_client, print_json};

async fn fetch_markers(config: &AppConfig) -> anyhow::Result<Vec<Record>> {
    let client = build_client(config)?;
    client
        .map_markers(&[])
        .await
        .context("failed to fetch map markers")
}

pub(crate) async fn run_random(config: &AppConfig) -> anyhow::Result<()> {
    let records = fetch_markers(config).await?;
    let record = pick_random(&records, &mut rand::rng())
        .context("no record is eligible for a random view")?;
    print_json(&json!({
        "record": record,
        "viewpoint": resolve(record),
    }))
}

pub(crate) async fn run_slideshow(
    config: &AppConfig,
    interval_secs: u64,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let records = fetch_markers(config).await?;

    let mut show = Slideshow::default();
    if !show.set_interval(Duration::from_secs(interval_secs)) {
        anyhow::bail!("slide interval must be at least one second");
    }
    show.refresh(&records);
    if !show.start() {
        anyhow::bail!("no record is eligible for the slideshow");
    }
    tracing::info!(slides = show.len(), interval_secs, "starting slideshow");

    let shown = play(&mut show, tokio::signal::ctrl_c(), limit, print_slide).await?;
    tracing::info!(shown, "slideshow stopped");
    Ok(())
}

/// Shows one slide per interval tick until `stop` resolves or `limit`
/// slides have been shown. Returns the number of slides shown.
///
/// `stop` is polled as a single pinned future for the whole run, and wins
/// over a tick that is ready at the same time.
async fn play<S, F>(
    show: &mut Slideshow,
    stop: S,
    limit: Option<usize>,
    mut emit: F,
) -> anyhow::Result<usize>
where
    S: Future,
    F: FnMut(usize, &SlideshowEntry) -> anyhow::Result<()>,
{
    let mut ticker = tokio::time::interval(show.interval());
    tokio::pin!(stop);
    let mut shown = 0usize;
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        // The first tick fires immediately and shows the first slide.
        if shown > 0 {
            show.advance();
        }
        if let Some(entry) = show.current() {
            emit(show.index(), entry)?;
        }

        shown += 1;
        if limit.is_some_and(|limit| shown >= limit) {
            break;
        }
    }

    show.stop();
    Ok(shown)
}

fn print_slide(index: usize, entry: &SlideshowEntry) -> anyhow::Result<()> {
    let line = json!({
        "index": index,
        "id": entry.record.id,
        "title": entry.record.title,
        "art": entry.record.art,
        "position": entry.position,
        "viewpoint": resolve(&entry.record),
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}
