//! Opportunity engine: pure functions from listings + comparable sales to
//! scored, classified opportunities. Nothing in here performs I/O or logs.

pub mod filter;
pub mod profit;
pub mod scoring;
pub mod stats;

use crate::config::EngineConfig;
use crate::models::{Comparable, Listing, Opportunity, OpportunityStatus};
use chrono::{DateTime, Utc};

pub use self::filter::filter_opportunities;
pub use self::profit::compute_profit_analysis;
pub use self::scoring::{classify_urgency, compute_score};
pub use self::stats::compute_stats;

/// Analyze, score and classify a listing into a fresh `Available` opportunity.
pub fn build_opportunity(
    listing: Listing,
    comparables: Vec<Comparable>,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Opportunity {
    let profit_analysis = compute_profit_analysis(&listing, &comparables, cfg);
    let score = compute_score(&listing, &profit_analysis, &comparables);
    let urgency = classify_urgency(&listing, &profit_analysis, score);

    Opportunity {
        id: listing.id.clone(),
        listing,
        comparables,
        profit_analysis,
        score,
        urgency,
        status: OpportunityStatus::Available,
        notes: String::new(),
        created_at: now,
        updated_at: now,
        purchase_price: None,
        sale_price: None,
        actual_profit: None,
    }
}

/// Stable sort, highest score first.
pub fn rank_by_score(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(|a, b| b.score.cmp(&a.score));
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{Category, Marketplace};
    use chrono::TimeZone;

    pub fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    pub fn listing(id: &str, price: f64) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("Item {}", id),
            description: "Used, works fine".to_string(),
            price,
            source: Marketplace::Craigslist,
            source_url: format!("https://craigslist.org/sfbay/item/{}", id),
            image_url: None,
            location: "san francisco".to_string(),
            posted_at: fixed_time(),
            category: Category::Electronics,
        }
    }

    pub fn comparables(prices: &[f64]) -> Vec<Comparable> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Comparable {
                title: format!("Similar item {}", i),
                sold_price: p,
                sold_date: fixed_time(),
                condition: "Used".to_string(),
                url: format!("https://ebay.com/itm/{}", i),
            })
            .collect()
    }

    pub fn opportunity(id: &str, title: &str, price: f64, sold: &[f64]) -> Opportunity {
        let mut l = listing(id, price);
        l.title = title.to_string();
        build_opportunity(l, comparables(sold), &EngineConfig::default(), fixed_time())
    }
}
