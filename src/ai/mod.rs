//! AI summary enrichment.
//!
//! Detects visible emails without a summary and fetches summaries in batches
//! from the summarization backend.

mod enricher;

pub use enricher::{EnrichCommand, EnrichEvent, EnricherHandle, spawn_enricher};
