use crate::models::{Category, Comparable, Listing, Marketplace, RawComparableRow, RawListingRow};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;
use url::Url;

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse price: strip currency symbols and thousands separators.
/// "$1,234.56" → 1234.56 | "75" → 75.0 | "-5" → None
pub fn parse_price(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let price: f64 = cleaned.parse().ok()?;
    if price < 0.0 || !price.is_finite() {
        return None;
    }
    Some(price)
}

/// Parse RFC 3339 timestamps or bare "YYYY-MM-DD" dates (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// Accept only absolute http(s) URLs.
pub fn parse_url(s: &str) -> Option<String> {
    let url = Url::parse(s.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

// ── Listings CSV → Listing ────────────────────────────────────────────────────

pub fn listing_row_to_listing(row: &RawListingRow) -> Option<Listing> {
    let id = non_empty(row.id.as_deref())?;
    let title = non_empty(row.title.as_deref())?;

    let price = match row.price.as_deref().and_then(parse_price) {
        Some(p) => p,
        None => {
            warn!("Listing {}: invalid price {:?}", id, row.price);
            return None;
        }
    };

    let source = match row.source.as_deref().map(str::parse::<Marketplace>) {
        Some(Ok(m)) => m,
        _ => {
            warn!("Listing {}: unknown source {:?}", id, row.source);
            return None;
        }
    };

    let source_url = match row.source_url.as_deref().and_then(parse_url) {
        Some(u) => u,
        None => {
            warn!("Listing {}: invalid source URL {:?}", id, row.source_url);
            return None;
        }
    };

    let posted_at = match row.posted_at.as_deref().and_then(parse_timestamp) {
        Some(t) => t,
        None => {
            warn!("Listing {}: invalid posted_at {:?}", id, row.posted_at);
            return None;
        }
    };

    let category = row
        .category
        .as_deref()
        .and_then(|c| c.parse::<Category>().ok())
        .unwrap_or(Category::Other);

    Some(Listing {
        id,
        title,
        description: non_empty(row.description.as_deref()).unwrap_or_default(),
        price,
        source,
        source_url,
        image_url: row.image_url.as_deref().and_then(parse_url),
        location: non_empty(row.location.as_deref()).unwrap_or_default(),
        posted_at,
        category,
    })
}

// ── Comparables CSV → (listing id, Comparable) ────────────────────────────────

pub fn comparable_row_to_comparable(row: &RawComparableRow) -> Option<(String, Comparable)> {
    let listing_id = non_empty(row.listing_id.as_deref())?;

    let sold_price = match row.sold_price.as_deref().and_then(parse_price) {
        Some(p) => p,
        None => {
            warn!("Comparable for {}: invalid sold price {:?}", listing_id, row.sold_price);
            return None;
        }
    };

    let sold_date = match row.sold_date.as_deref().and_then(parse_timestamp) {
        Some(t) => t,
        None => {
            warn!("Comparable for {}: invalid sold date {:?}", listing_id, row.sold_date);
            return None;
        }
    };

    let comparable = Comparable {
        title: non_empty(row.title.as_deref()).unwrap_or_default(),
        sold_price,
        sold_date,
        condition: non_empty(row.condition.as_deref()).unwrap_or_else(|| "Used".to_string()),
        url: non_empty(row.url.as_deref()).unwrap_or_default(),
    };

    Some((listing_id, comparable))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
