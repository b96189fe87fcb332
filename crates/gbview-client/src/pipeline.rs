//! Bounded-concurrency enrichment of record ids into resolved viewpoints.
//!
//! A fixed number of workers share an atomic cursor over the input list and
//! each claims the next unclaimed index until the list is exhausted. Every
//! index ends up with exactly one entry: the record plus its viewpoint, or an
//! unavailable marker carrying the id and the reason. Per-record faults never
//! fail the batch.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use gbview_core::{resolve, AppConfig, Record, Viewpoint};
use serde::Serialize;

use crate::error::EnrichError;

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Number of in-flight fetches. Raised to 1 and capped to the input length.
    pub concurrency: usize,
    pub fetch_timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl EnrichOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            concurrency: config.enrich_concurrency,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    FetchFailed,
    TimedOut,
    /// Fetched, but neither stored coordinates nor the reference link yield a position.
    NoPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichedEntry {
    Resolved {
        record: Box<Record>,
        viewpoint: Viewpoint,
    },
    Unavailable {
        id: i64,
        reason: UnavailableReason,
    },
}

impl EnrichedEntry {
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::Resolved { record, .. } => record.id,
            Self::Unavailable { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Entries in input order; `entries()[i]` belongs to `ids[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichmentResult {
    entries: Vec<EnrichedEntry>,
}

impl EnrichmentResult {
    #[must_use]
    pub fn entries(&self) -> &[EnrichedEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<EnrichedEntry> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved entries only, in input order.
    pub fn renderable(&self) -> impl Iterator<Item = (&Record, &Viewpoint)> {
        self.entries.iter().filter_map(|entry| match entry {
            EnrichedEntry::Resolved { record, viewpoint } => Some((record.as_ref(), viewpoint)),
            EnrichedEntry::Unavailable { .. } => None,
        })
    }

    #[must_use]
    pub fn unavailable_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_resolved()).count()
    }
}

/// Fetches and resolves every id in `ids` with at most
/// `options.concurrency` fetches in flight.
///
/// # Errors
///
/// Returns [`EnrichError::InvalidId`] if any id is not positive. This is
/// checked before the first fetch; nothing else fails the batch.
pub async fn enrich<F, Fut, E>(
    ids: &[i64],
    fetch_detail: F,
    options: EnrichOptions,
) -> Result<EnrichmentResult, EnrichError>
where
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<Record, E>>,
    E: Display,
{
    if let Some((index, &id)) = ids.iter().enumerate().find(|(_, id)| **id <= 0) {
        return Err(EnrichError::InvalidId { index, id });
    }
    if ids.is_empty() {
        return Ok(EnrichmentResult::default());
    }

    let workers = options.concurrency.max(1).min(ids.len());
    tracing::debug!(records = ids.len(), workers, "enriching records");

    let cursor = AtomicUsize::new(0);
    let cursor = &cursor;
    let fetch_detail = &fetch_detail;

    let batches = join_all((0..workers).map(move |_| async move {
        let mut filled = Vec::new();
        loop {
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(&id) = ids.get(index) else {
                break;
            };
            let entry = enrich_one(id, fetch_detail, options.fetch_timeout).await;
            filled.push((index, entry));
        }
        filled
    }))
    .await;

    let mut filled: Vec<(usize, EnrichedEntry)> = batches.into_iter().flatten().collect();
    filled.sort_unstable_by_key(|(index, _)| *index);
    let result = EnrichmentResult {
        entries: filled.into_iter().map(|(_, entry)| entry).collect(),
    };

    tracing::info!(
        records = result.len(),
        unavailable = result.unavailable_count(),
        "enrichment complete"
    );
    Ok(result)
}

async fn enrich_one<F, Fut, E>(id: i64, fetch_detail: &F, fetch_timeout: Duration) -> EnrichedEntry
where
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<Record, E>>,
    E: Display,
{
    let reason = match tokio::time::timeout(fetch_timeout, fetch_detail(id)).await {
        Ok(Ok(record)) => match resolve(&record) {
            Some(viewpoint) => {
                return EnrichedEntry::Resolved {
                    record: Box::new(record),
                    viewpoint,
                }
            }
            None => {
                tracing::debug!(id, "record has no resolvable position");
                UnavailableReason::NoPosition
            }
        },
        Ok(Err(e)) => {
            tracing::warn!(id, error = %e, "record fetch failed");
            UnavailableReason::FetchFailed
        }
        Err(_) => {
            #[allow(clippy::cast_possible_truncation)]
            let timeout_ms = fetch_timeout.as_millis() as u64;
            tracing::warn!(id, timeout_ms, "record fetch timed out");
            UnavailableReason::TimedOut
        }
    };
    EnrichedEntry::Unavailable { id, reason }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
