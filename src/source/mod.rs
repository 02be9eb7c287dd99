pub mod cleaner;
pub mod csv_source;
pub mod simulated;

use crate::config::{SourceConfig, SourceKind};
use crate::models::{Comparable, Listing, SearchParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub use self::csv_source::CsvSource;
pub use self::simulated::SimulatedSource;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable listing + sold-comparables provider.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self, params: &SearchParams) -> Result<Vec<Listing>>;
    async fn fetch_comparables(&self, listing: &Listing) -> Result<Vec<Comparable>>;
}

/// Build the configured source. `seed` overrides `source.seed` for simulated data.
pub fn from_config(cfg: &SourceConfig, seed: Option<u64>) -> Result<Arc<dyn ListingSource>> {
    match cfg.kind {
        SourceKind::Simulated => {
            let source = SimulatedSource::new(seed.or(cfg.seed));
            info!("Using simulated listings (seed {})", source.seed());
            Ok(Arc::new(source))
        }
        SourceKind::Csv => {
            let source = CsvSource::open(&cfg.listings_csv, &cfg.comparables_csv)
                .context("Failed to open CSV listing source")?;
            info!(
                "Using CSV listings from {:?} ({} listings)",
                cfg.listings_csv,
                source.listing_count()
            );
            Ok(Arc::new(source))
        }
    }
}
