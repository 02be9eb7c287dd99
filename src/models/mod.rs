use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ── Marketplace ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Craigslist,
    Offerup,
    Facebook,
    Ebay,
}

impl Marketplace {
    pub const ALL: [Marketplace; 4] = [
        Marketplace::Craigslist,
        Marketplace::Offerup,
        Marketplace::Facebook,
        Marketplace::Ebay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::Craigslist => "craigslist",
            Marketplace::Offerup => "offerup",
            Marketplace::Facebook => "facebook",
            Marketplace::Ebay => "ebay",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Marketplace::Craigslist => "Craigslist",
            Marketplace::Offerup => "OfferUp",
            Marketplace::Facebook => "Facebook Marketplace",
            Marketplace::Ebay => "eBay",
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Marketplace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Marketplace::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown marketplace '{}'", s))
    }
}

// ── Category ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Furniture,
    Vehicles,
    Appliances,
    Collectibles,
    Clothing,
    Tools,
    Sports,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Electronics,
        Category::Furniture,
        Category::Vehicles,
        Category::Appliances,
        Category::Collectibles,
        Category::Clothing,
        Category::Tools,
        Category::Sports,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Furniture => "furniture",
            Category::Vehicles => "vehicles",
            Category::Appliances => "appliances",
            Category::Collectibles => "collectibles",
            Category::Clothing => "clothing",
            Category::Tools => "tools",
            Category::Sports => "sports",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Furniture => "Furniture",
            Category::Vehicles => "Vehicles",
            Category::Appliances => "Appliances",
            Category::Collectibles => "Collectibles",
            Category::Clothing => "Clothing",
            Category::Tools => "Tools",
            Category::Sports => "Sports & Outdoors",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

// ── Opportunity status ────────────────────────────────────────────────────────

/// Deal lifecycle. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    Available,
    Contacted,
    Purchased,
    Listed,
    Sold,
    Passed,
}

impl OpportunityStatus {
    pub const ALL: [OpportunityStatus; 6] = [
        OpportunityStatus::Available,
        OpportunityStatus::Contacted,
        OpportunityStatus::Purchased,
        OpportunityStatus::Listed,
        OpportunityStatus::Sold,
        OpportunityStatus::Passed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Available => "available",
            OpportunityStatus::Contacted => "contacted",
            OpportunityStatus::Purchased => "purchased",
            OpportunityStatus::Listed => "listed",
            OpportunityStatus::Sold => "sold",
            OpportunityStatus::Passed => "passed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OpportunityStatus::Available => "Available",
            OpportunityStatus::Contacted => "Contacted",
            OpportunityStatus::Purchased => "Purchased",
            OpportunityStatus::Listed => "Listed for Sale",
            OpportunityStatus::Sold => "Sold",
            OpportunityStatus::Passed => "Passed",
        }
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OpportunityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        OpportunityStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown status '{}'", s))
    }
}

// ── Confidence / urgency ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// One level down; `Low` stays `Low`.
    pub fn demoted(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        };
        f.pad(s)
    }
}

// ── Listing & comparables ─────────────────────────────────────────────────────

/// A candidate item found on a local marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub source: Marketplace,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub location: String,
    pub posted_at: DateTime<Utc>,
    pub category: Category,
}

/// A historical sale of a similar item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comparable {
    pub title: String,
    pub sold_price: f64,
    pub sold_date: DateTime<Utc>,
    pub condition: String,
    pub url: String,
}

// ── Profit analysis ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Fees {
    #[serde(alias = "ebay")]
    pub marketplace: f64,
    pub shipping: f64,
    pub other: f64,
}

impl Fees {
    pub fn total(&self) -> f64 {
        self.marketplace + self.shipping + self.other
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAnalysis {
    pub estimated_sale_price: f64,
    /// Never negative.
    pub estimated_profit: f64,
    /// Percent of asking price, never negative.
    pub profit_margin: f64,
    pub fees: Fees,
    pub confidence: Confidence,
    pub reasoning: String,
}

// ── Opportunity ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    /// Same as the listing id.
    pub id: String,
    pub listing: Listing,
    #[serde(default, alias = "ebayComparables")]
    pub comparables: Vec<Comparable>,
    pub profit_analysis: ProfitAnalysis,
    /// 0–100
    pub score: u8,
    pub urgency: Urgency,
    pub status: OpportunityStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_profit: Option<f64>,
}

impl Opportunity {
    pub fn set_status(&mut self, status: OpportunityStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>, at: DateTime<Utc>) {
        self.notes = notes.into();
        self.updated_at = at;
    }

    pub fn record_purchase(&mut self, price: f64, at: DateTime<Utc>) {
        self.purchase_price = Some(price);
        self.refresh_actual_profit();
        self.updated_at = at;
    }

    pub fn record_sale(&mut self, price: f64, at: DateTime<Utc>) {
        self.sale_price = Some(price);
        self.refresh_actual_profit();
        self.updated_at = at;
    }

    fn refresh_actual_profit(&mut self) {
        self.actual_profit = match (self.purchase_price, self.sale_price) {
            (Some(bought), Some(sold)) => Some(sold - bought),
            _ => None,
        };
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

/// Conjunctive filter set. `None` or an empty list places no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OpportunityFilters {
    pub query: Option<String>,
    pub city: Option<String>,
    pub marketplaces: Vec<Marketplace>,
    pub categories: Vec<Category>,
    pub min_profit: Option<f64>,
    pub max_price: Option<f64>,
    pub min_score: Option<u8>,
    pub status: Vec<OpportunityStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: String,
    pub city: String,
    pub marketplaces: Vec<Marketplace>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityStats {
    pub total_opportunities: usize,
    pub total_potential_profit: f64,
    pub avg_score: f64,
    pub by_status: BTreeMap<OpportunityStatus, usize>,
    pub by_marketplace: BTreeMap<Marketplace, usize>,
}

// ── Raw CSV rows ──────────────────────────────────────────────────────────────

/// Listings CSV: id, title, description, price, source, source_url, image_url,
/// location, posted_at, category
#[derive(Debug, Clone, Default)]
pub struct RawListingRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub posted_at: Option<String>,
    pub category: Option<String>,
}

/// Comparables CSV: listing_id, title, sold_price, sold_date, condition, url
#[derive(Debug, Clone, Default)]
pub struct RawComparableRow {
    pub listing_id: Option<String>,
    pub title: Option<String>,
    pub sold_price: Option<String>,
    pub sold_date: Option<String>,
    pub condition: Option<String>,
    pub url: Option<String>,
}
