pub mod client;
pub mod error;
pub mod pipeline;
mod retry;

pub use client::RecordClient;
pub use error::{ClientError, EnrichError};
pub use pipeline::{
    enrich, EnrichOptions, EnrichedEntry, EnrichmentResult, UnavailableReason,
    DEFAULT_CONCURRENCY,
};
