use crate::models::{Opportunity, OpportunityFilters};

impl OpportunityFilters {
    /// True when `opp` satisfies every constraint that is set.
    pub fn matches(&self, opp: &Opportunity) -> bool {
        if let Some(query) = self.query.as_deref() {
            if !contains_ignore_case(&opp.listing.title, query) {
                return false;
            }
        }

        if let Some(city) = self.city.as_deref() {
            if !contains_ignore_case(&opp.listing.location, city) {
                return false;
            }
        }

        if !self.marketplaces.is_empty() && !self.marketplaces.contains(&opp.listing.source) {
            return false;
        }

        if !self.categories.is_empty() && !self.categories.contains(&opp.listing.category) {
            return false;
        }

        if let Some(min_profit) = self.min_profit {
            if opp.profit_analysis.estimated_profit < min_profit {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if opp.listing.price > max_price {
                return false;
            }
        }

        if let Some(min_score) = self.min_score {
            if opp.score < min_score {
                return false;
            }
        }

        if !self.status.is_empty() && !self.status.contains(&opp.status) {
            return false;
        }

        true
    }

    pub fn is_empty(&self) -> bool {
        *self == OpportunityFilters::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Keep the opportunities matching `filters`, in their original order.
pub fn filter_opportunities(
    opportunities: &[Opportunity],
    filters: &OpportunityFilters,
) -> Vec<Opportunity> {
    opportunities
        .iter()
        .filter(|opp| filters.matches(opp))
        .cloned()
        .collect()
}
