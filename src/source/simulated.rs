//! Demo listing source: plausible listings and sold comparables generated
//! from the search terms. Every draw comes from a seeded RNG, so a fixed seed
//! reproduces prices, counts and conditions exactly.

use crate::models::{Category, Comparable, Listing, Marketplace, SearchParams};
use crate::source::ListingSource;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;
use url::Url;

const SECS_PER_DAY: i64 = 86_400;
const PLACEHOLDER_IMAGE: &str = "https://placehold.co/400x300?text=Item+Photo";

struct Template {
    id: &'static str,
    title: fn(&str) -> String,
    description: fn(&str) -> String,
    /// Asking price drawn from `min..min + span` whole dollars.
    min_price: u32,
    span: u32,
    source: Marketplace,
    max_age_days: i64,
    category: Category,
}

static TEMPLATES: [Template; 5] = [
    Template {
        id: "1",
        title: |q| format!("{q} - Great Condition"),
        description: |q| format!("Used {q} in excellent working condition. Selling because upgrading."),
        min_price: 50,
        span: 200,
        source: Marketplace::Craigslist,
        max_age_days: 3,
        category: Category::Electronics,
    },
    Template {
        id: "2",
        title: |q| format!("{q} - Must Go Today!"),
        description: |q| format!("Moving sale! {q} barely used. Pick up only."),
        min_price: 30,
        span: 150,
        source: Marketplace::Offerup,
        max_age_days: 1,
        category: Category::Electronics,
    },
    Template {
        id: "3",
        title: |q| format!("Vintage {q}"),
        description: |q| format!("Rare vintage {q}. Collectors item in working condition."),
        min_price: 100,
        span: 300,
        source: Marketplace::Facebook,
        max_age_days: 5,
        category: Category::Collectibles,
    },
    Template {
        id: "4",
        title: |q| format!("{q} Bundle Deal"),
        description: |q| format!("Includes {q} plus accessories. Great starter kit."),
        min_price: 25,
        span: 100,
        source: Marketplace::Craigslist,
        max_age_days: 2,
        category: Category::Electronics,
    },
    Template {
        id: "5",
        title: |q| format!("Like New {q}"),
        description: |q| format!("Barely used {q}. Comes with original box and manual."),
        min_price: 75,
        span: 175,
        source: Marketplace::Offerup,
        max_age_days: 1,
        category: Category::Electronics,
    },
];

pub struct SimulatedSource {
    seed: u64,
}

impl SimulatedSource {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed: seed.unwrap_or_else(rand::random),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream per key so listings and comparables don't shift
    /// when other searches run in between.
    fn rng_for(&self, key: impl Hash) -> StdRng {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }
}

fn source_url(source: Marketplace, city: &str, id: &str) -> Result<String> {
    let (base, segments): (&str, Vec<&str>) = match source {
        Marketplace::Craigslist => ("https://craigslist.org", vec![city, "item", id]),
        Marketplace::Offerup => ("https://offerup.com", vec!["item", id]),
        Marketplace::Facebook => ("https://facebook.com", vec!["marketplace", "item", id]),
        Marketplace::Ebay => ("https://ebay.com", vec!["itm", id]),
    };

    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("{} cannot be a base URL", base))?
        .extend(segments);
    Ok(url.to_string())
}

#[async_trait]
impl ListingSource for SimulatedSource {
    async fn fetch_listings(&self, params: &SearchParams) -> Result<Vec<Listing>> {
        let mut rng = self.rng_for((&params.query, &params.city));
        let now = Utc::now();
        let mut listings = Vec::new();

        for t in &TEMPLATES {
            // Draw for every template so filtering doesn't change the others' prices.
            let price = rng.random_range(t.min_price..t.min_price + t.span) as f64;
            let age_secs = rng.random_range(0..t.max_age_days * SECS_PER_DAY);

            if !params.marketplaces.contains(&t.source) {
                continue;
            }

            listings.push(Listing {
                id: t.id.to_string(),
                title: (t.title)(&params.query),
                description: (t.description)(&params.query),
                price,
                source: t.source,
                source_url: source_url(t.source, &params.city, t.id)?,
                image_url: Some(PLACEHOLDER_IMAGE.to_string()),
                location: params.city.clone(),
                posted_at: now - Duration::seconds(age_secs),
                category: t.category,
            });
        }

        debug!("Simulated {} listings for '{}'", listings.len(), params.query);
        Ok(listings)
    }

    async fn fetch_comparables(&self, listing: &Listing) -> Result<Vec<Comparable>> {
        let mut rng = self.rng_for((&listing.id, &listing.title));
        let now = Utc::now();

        let base_price = listing.price * rng.random_range(1.5..2.0);
        let count = rng.random_range(2..=6usize);

        let comparables = (0..count)
            .map(|i| Comparable {
                title: format!("{} - Similar", listing.title),
                sold_price: base_price * rng.random_range(0.9..1.1),
                sold_date: now - Duration::seconds(rng.random_range(0..30 * SECS_PER_DAY)),
                condition: if rng.random_bool(0.5) { "Used" } else { "Pre-owned" }.to_string(),
                url: format!("https://ebay.com/itm/{}{}", listing.id, i),
            })
            .collect();

        Ok(comparables)
    }
}
