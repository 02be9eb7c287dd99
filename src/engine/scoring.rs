//! Opportunity score (0–100) and urgency classification.

use crate::models::{Comparable, Confidence, Listing, ProfitAnalysis, Urgency};

/// (minimum margin %, points)
const MARGIN_BANDS: [(f64, u8); 5] = [(100.0, 40), (75.0, 35), (50.0, 30), (30.0, 20), (15.0, 10)];

/// (minimum profit $, points)
const PROFIT_BANDS: [(f64, u8); 5] = [(200.0, 25), (100.0, 20), (50.0, 15), (25.0, 10), (10.0, 5)];

/// (minimum comparable count, points)
const COMPARABLE_BANDS: [(usize, u8); 3] = [(5, 15), (3, 10), (1, 5)];

pub const MAX_SCORE: u8 = 100;

/// First band whose threshold `value` reaches, else 0. Bands are ordered high to low.
fn band_points<T: PartialOrd + Copy>(value: T, bands: &[(T, u8)]) -> u8 {
    bands
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

fn confidence_points(confidence: Confidence) -> u8 {
    match confidence {
        Confidence::High => 20,
        Confidence::Medium => 12,
        Confidence::Low => 5,
    }
}

/// Additive score over margin (≤40), absolute profit (≤25), confidence (≤20)
/// and comparable count (≤15), capped at 100.
pub fn compute_score(
    _listing: &Listing,
    analysis: &ProfitAnalysis,
    comparables: &[Comparable],
) -> u8 {
    let total = band_points(analysis.profit_margin, &MARGIN_BANDS)
        + band_points(analysis.estimated_profit, &PROFIT_BANDS)
        + confidence_points(analysis.confidence)
        + band_points(comparables.len(), &COMPARABLE_BANDS);

    total.min(MAX_SCORE)
}

/// First matching rule wins:
/// 1. score ≥ 80 and margin ≥ 75% → high
/// 2. price < $50 and profit ≥ $50 → high
/// 3. score ≥ 60 or margin ≥ 40% → medium
/// 4. low
pub fn classify_urgency(listing: &Listing, analysis: &ProfitAnalysis, score: u8) -> Urgency {
    if score >= 80 && analysis.profit_margin >= 75.0 {
        return Urgency::High;
    }
    if listing.price < 50.0 && analysis.estimated_profit >= 50.0 {
        return Urgency::High;
    }
    if score >= 60 || analysis.profit_margin >= 40.0 {
        return Urgency::Medium;
    }
    Urgency::Low
}
