//! Search pipeline: source → engine.
//!
//! 1. Fetch listings for the query/city and keep the requested marketplaces
//!    and categories.
//! 2. Fetch comparables for every listing (bounded concurrency), then
//!    analyze, score and classify each one.
//! 3. Rank by score (stable, highest first), truncate to `max_results`, and
//!    aggregate stats.
//!
//! A listing whose comparables can't be fetched is logged and skipped.

use crate::config::AppConfig;
use crate::engine::{build_opportunity, compute_stats, rank_by_score};
use crate::models::{Opportunity, OpportunityStats, SearchParams};
use crate::source::ListingSource;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub struct Pipeline {
    config: AppConfig,
    source: Arc<dyn ListingSource>,
}

impl Pipeline {
    pub fn new(config: AppConfig, source: Arc<dyn ListingSource>) -> Self {
        Self { config, source }
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchOutcome> {
        if params.query.trim().is_empty() {
            bail!("Search query is required");
        }

        // ── 1. Listings ───────────────────────────────────────────────────────
        let mut listings = self
            .source
            .fetch_listings(params)
            .await
            .with_context(|| format!("Listing fetch failed for '{}'", params.query))?;

        let fetched = listings.len();
        listings.retain(|l| params.marketplaces.contains(&l.source));
        if !params.categories.is_empty() {
            listings.retain(|l| params.categories.contains(&l.category));
        }
        info!(
            "'{}' in {}: {} listings ({} after marketplace/category selection)",
            params.query,
            params.city,
            fetched,
            listings.len()
        );

        // ── 2. Comparables + analysis ─────────────────────────────────────────
        let now = Utc::now();
        let sem = Arc::new(Semaphore::new(self.config.search.concurrency.max(1)));
        let mut handles = Vec::with_capacity(listings.len());

        for listing in listings {
            let source = Arc::clone(&self.source);
            let sem = Arc::clone(&sem);
            let engine_cfg = self.config.engine.clone();
            let id = listing.id.clone();

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire().await?;

                let comparables = source
                    .fetch_comparables(&listing)
                    .await
                    .with_context(|| format!("fetch_comparables({})", listing.id))?;

                Ok::<Opportunity, anyhow::Error>(build_opportunity(
                    listing,
                    comparables,
                    &engine_cfg,
                    now,
                ))
            });

            handles.push((id, handle));
        }

        // Awaited in listing order so ties keep the source's order after ranking.
        let mut opportunities = Vec::with_capacity(handles.len());
        let mut errors = 0usize;

        for (id, handle) in handles {
            match handle.await {
                Ok(Ok(opp)) => opportunities.push(opp),
                Ok(Err(e)) => {
                    warn!("{}: {:#}", id, e);
                    errors += 1;
                }
                Err(e) => {
                    error!("Task panic for {}: {}", id, e);
                    errors += 1;
                }
            }
        }

        // ── 3. Rank + stats ───────────────────────────────────────────────────
        rank_by_score(&mut opportunities);
        if let Some(max) = params.max_results {
            opportunities.truncate(max);
        }

        let stats = compute_stats(&opportunities);
        info!(
            "=== Done: {} opportunities | avg score {:.1} | potential profit ${:.2} | {} errors ===",
            stats.total_opportunities, stats.avg_score, stats.total_potential_profit, errors,
        );

        Ok(SearchOutcome {
            opportunities,
            stats,
            errors,
        })
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub opportunities: Vec<Opportunity>,
    pub stats: OpportunityStats,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{comparables, listing};
    use crate::models::{Category, Comparable, Listing, Marketplace};
    use crate::source::SimulatedSource;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory source; listings without an entry in `sold` fail to fetch.
    struct FixedSource {
        listings: Vec<Listing>,
        sold: HashMap<String, Vec<f64>>,
    }

    #[async_trait]
    impl ListingSource for FixedSource {
        async fn fetch_listings(&self, _params: &SearchParams) -> Result<Vec<Listing>> {
            Ok(self.listings.clone())
        }

        async fn fetch_comparables(&self, listing: &Listing) -> Result<Vec<Comparable>> {
            self.sold
                .get(&listing.id)
                .map(|prices| comparables(prices))
                .ok_or_else(|| anyhow!("upstream timeout"))
        }
    }

    fn params() -> SearchParams {
        SearchParams {
            query: "item".into(),
            city: "san francisco".into(),
            marketplaces: vec![Marketplace::Craigslist, Marketplace::Offerup, Marketplace::Facebook],
            categories: vec![],
            max_results: None,
        }
    }

    fn fixed_source() -> FixedSource {
        let mut fb = listing("fb", 100.0);
        fb.source = Marketplace::Facebook;
        let mut ebay = listing("ebay", 10.0);
        ebay.source = Marketplace::Ebay;
        let mut sofa = listing("sofa", 40.0);
        sofa.category = Category::Furniture;

        let sold = HashMap::from([
            ("low1".to_string(), vec![]),
            ("fb".to_string(), vec![180.0, 190.0, 200.0, 210.0, 220.0]),
            ("ebay".to_string(), vec![500.0; 5]),
            ("sofa".to_string(), vec![]),
        ]);

        FixedSource {
            listings: vec![listing("low1", 40.0), fb, ebay, listing("broken", 20.0), sofa],
            sold,
        }
    }

    fn run(source: FixedSource, params: &SearchParams) -> SearchOutcome {
        let pipeline = Pipeline::new(AppConfig::default(), Arc::new(source));
        tokio_test::block_on(pipeline.search(params)).unwrap()
    }

    #[test]
    fn test_ranked_and_filtered() {
        let outcome = run(fixed_source(), &params());

        let ids: Vec<&str> = outcome.opportunities.iter().map(|o| o.id.as_str()).collect();
        // ebay excluded by marketplace, broken skipped, ties keep source order
        assert_eq!(ids, vec!["fb", "low1", "sofa"]);
        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.stats.total_opportunities, 3);
        assert_eq!(outcome.stats.by_marketplace[&Marketplace::Ebay], 0);
    }

    #[test]
    fn test_categories_and_max_results() {
        let mut p = params();
        p.categories = vec![Category::Electronics];
        p.max_results = Some(1);

        let outcome = run(fixed_source(), &p);
        assert_eq!(outcome.opportunities.len(), 1);
        assert_eq!(outcome.opportunities[0].id, "fb");
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let pipeline = Pipeline::new(AppConfig::default(), Arc::new(fixed_source()));
        let mut p = params();
        p.query = "  ".into();
        let err = tokio_test::block_on(pipeline.search(&p)).unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[tokio::test]
    async fn test_simulated_search() {
        let pipeline = Pipeline::new(AppConfig::default(), Arc::new(SimulatedSource::new(Some(3))));
        let outcome = pipeline.search(&params()).await.unwrap();

        assert_eq!(outcome.opportunities.len(), 5);
        assert_eq!(outcome.errors, 0);
        assert!(outcome.opportunities.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(outcome.opportunities.iter().all(|o| o.score <= 100 && o.comparables.len() >= 2));
    }
}
