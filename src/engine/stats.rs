use crate::models::{Marketplace, Opportunity, OpportunityStats, OpportunityStatus};
use std::collections::BTreeMap;

/// Totals, mean score and per-status / per-marketplace counts in one pass.
/// Every status and marketplace appears in the breakdowns, zero if unseen.
pub fn compute_stats(opportunities: &[Opportunity]) -> OpportunityStats {
    let mut by_status: BTreeMap<OpportunityStatus, usize> =
        OpportunityStatus::ALL.into_iter().map(|s| (s, 0)).collect();
    let mut by_marketplace: BTreeMap<Marketplace, usize> =
        Marketplace::ALL.into_iter().map(|m| (m, 0)).collect();

    let mut total_profit = 0.0;
    let mut total_score = 0u64;

    for opp in opportunities {
        *by_status.entry(opp.status).or_insert(0) += 1;
        *by_marketplace.entry(opp.listing.source).or_insert(0) += 1;
        total_profit += opp.profit_analysis.estimated_profit;
        total_score += u64::from(opp.score);
    }

    let avg_score = if opportunities.is_empty() {
        0.0
    } else {
        total_score as f64 / opportunities.len() as f64
    };

    OpportunityStats {
        total_opportunities: opportunities.len(),
        total_potential_profit: total_profit,
        avg_score,
        by_status,
        by_marketplace,
    }
}
