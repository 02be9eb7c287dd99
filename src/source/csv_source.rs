//! Offline listing source backed by two CSV files.

use crate::models::{Comparable, Listing, RawComparableRow, RawListingRow, SearchParams};
use crate::source::cleaner::{comparable_row_to_comparable, listing_row_to_listing};
use crate::source::ListingSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct CsvSource {
    listings: Vec<Listing>,
    comparables: HashMap<String, Vec<Comparable>>,
}

impl CsvSource {
    /// Load both files up front. A missing comparables file means no comparables.
    pub fn open(listings_path: &Path, comparables_path: &Path) -> Result<Self> {
        let listings = load_listings(listings_path)?;
        let comparables = if comparables_path.exists() {
            load_comparables(comparables_path)?
        } else {
            warn!("{:?} not found, listings will have no comparables", comparables_path);
            HashMap::new()
        };
        Ok(Self { listings, comparables })
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }
}

#[async_trait]
impl ListingSource for CsvSource {
    async fn fetch_listings(&self, params: &SearchParams) -> Result<Vec<Listing>> {
        let query = params.query.to_lowercase();
        let city = params.city.to_lowercase();

        let found: Vec<Listing> = self
            .listings
            .iter()
            .filter(|l| l.title.to_lowercase().contains(&query))
            .filter(|l| l.location.to_lowercase().contains(&city))
            .cloned()
            .collect();

        debug!("CSV source: {} of {} listings match", found.len(), self.listings.len());
        Ok(found)
    }

    async fn fetch_comparables(&self, listing: &Listing) -> Result<Vec<Comparable>> {
        Ok(self.comparables.get(&listing.id).cloned().unwrap_or_default())
    }
}

/// id, title, description, price, source, source_url, image_url, location, posted_at, category
pub fn load_listings(path: &Path) -> Result<Vec<Listing>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let mut listings = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                continue;
            }
        };

        let raw = RawListingRow {
            id: record.get(0).map(|s| s.to_string()),
            title: record.get(1).map(|s| s.to_string()),
            description: record.get(2).map(|s| s.to_string()),
            price: record.get(3).map(|s| s.to_string()),
            source: record.get(4).map(|s| s.to_string()),
            source_url: record.get(5).map(|s| s.to_string()),
            image_url: record.get(6).map(|s| s.to_string()),
            location: record.get(7).map(|s| s.to_string()),
            posted_at: record.get(8).map(|s| s.to_string()),
            category: record.get(9).map(|s| s.to_string()),
        };

        if let Some(listing) = listing_row_to_listing(&raw) {
            listings.push(listing);
        }
    }

    info!("{:?}: {} listings loaded", path, listings.len());
    Ok(listings)
}

/// listing_id, title, sold_price, sold_date, condition, url
pub fn load_comparables(path: &Path) -> Result<HashMap<String, Vec<Comparable>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let mut by_listing: HashMap<String, Vec<Comparable>> = HashMap::new();
    let mut total = 0usize;

    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                continue;
            }
        };

        let raw = RawComparableRow {
            listing_id: record.get(0).map(|s| s.to_string()),
            title: record.get(1).map(|s| s.to_string()),
            sold_price: record.get(2).map(|s| s.to_string()),
            sold_date: record.get(3).map(|s| s.to_string()),
            condition: record.get(4).map(|s| s.to_string()),
            url: record.get(5).map(|s| s.to_string()),
        };

        if let Some((listing_id, comparable)) = comparable_row_to_comparable(&raw) {
            by_listing.entry(listing_id).or_default().push(comparable);
            total += 1;
        }
    }

    info!("{:?}: {} comparables for {} listings", path, total, by_listing.len());
    Ok(by_listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Marketplace;
    use std::path::PathBuf;

    const LISTINGS: &str = "\
id,title,description,price,source,source_url,image_url,location,posted_at,category
1,Road Bike,Carbon frame,$400,craigslist,https://craigslist.org/sfbay/item/1,,San Francisco,2024-05-30,sports
2,Bike Rack,,abc,offerup,https://offerup.com/item/2,,San Francisco,2024-05-30,sports
3,Mountain bike,,250,facebook,https://facebook.com/marketplace/item/3,,Oakland,2024-05-29T10:00:00Z,sports
";

    const COMPARABLES: &str = "\
listing_id,title,sold_price,sold_date,condition,url
1,Road Bike 54cm,650,2024-05-01,Used,https://ebay.com/itm/11
1,Road Bike 56cm,700,2024-05-03,Pre-owned,https://ebay.com/itm/12
3,Mountain Bike,n/a,2024-05-03,Used,https://ebay.com/itm/31
";

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flip-scout-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn params(query: &str, city: &str) -> SearchParams {
        SearchParams {
            query: query.into(),
            city: city.into(),
            marketplaces: Marketplace::ALL.to_vec(),
            categories: vec![],
            max_results: None,
        }
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let listings = load_listings(&fixture("listings_a.csv", LISTINGS)).unwrap();
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let comps = load_comparables(&fixture("comparables_a.csv", COMPARABLES)).unwrap();
        assert_eq!(comps["1"].len(), 2);
        assert!(!comps.contains_key("3"));
    }

    #[test]
    fn test_fetch_filters_by_query_and_city() {
        let source = CsvSource::open(
            &fixture("listings_b.csv", LISTINGS),
            &fixture("comparables_b.csv", COMPARABLES),
        )
        .unwrap();

        let found = tokio_test::block_on(source.fetch_listings(&params("bike", "san francisco"))).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");

        let comps = tokio_test::block_on(source.fetch_comparables(&found[0])).unwrap();
        assert_eq!(comps.len(), 2);

        let oakland = tokio_test::block_on(source.fetch_listings(&params("BIKE", "oak"))).unwrap();
        let none = tokio_test::block_on(source.fetch_comparables(&oakland[0])).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_missing_comparables_file() {
        let source = CsvSource::open(
            &fixture("listings_c.csv", LISTINGS),
            Path::new("/nonexistent/comparables.csv"),
        )
        .unwrap();
        assert_eq!(source.listing_count(), 2);
    }
}
