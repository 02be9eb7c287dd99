//! Profit analysis: resale estimate, fee breakdown and confidence.

use crate::config::{EngineConfig, FeeSchedule};
use crate::models::{Comparable, Confidence, Fees, Listing, ProfitAnalysis};

pub const NO_COMPARABLES_REASONING: &str = "No comparable sales found.";

/// Estimate resale profit for `listing` from its comparable sales.
///
/// With no comparables the sale price falls back to `price × fallback_markup`
/// and profit, margin and fees are all zero with `Low` confidence.
pub fn compute_profit_analysis(
    listing: &Listing,
    comparables: &[Comparable],
    cfg: &EngineConfig,
) -> ProfitAnalysis {
    if comparables.is_empty() {
        return ProfitAnalysis {
            estimated_sale_price: listing.price * cfg.fallback_markup,
            estimated_profit: 0.0,
            profit_margin: 0.0,
            fees: Fees::default(),
            confidence: Confidence::Low,
            reasoning: NO_COMPARABLES_REASONING.to_string(),
        };
    }

    let avg_sold_price = average_sold_price(comparables);
    let fees = fee_breakdown(avg_sold_price, &cfg.fees);

    let estimated_profit = avg_sold_price - listing.price - fees.total();
    let profit_margin = if listing.price > 0.0 {
        estimated_profit / listing.price * 100.0
    } else {
        0.0
    };

    let confidence = assess_confidence(comparables, avg_sold_price, cfg.variance_threshold);
    let reasoning = format!(
        "Based on {} recent comparable sales averaging ${:.2}. {}",
        comparables.len(),
        avg_sold_price,
        confidence_note(confidence),
    );

    ProfitAnalysis {
        estimated_sale_price: avg_sold_price,
        estimated_profit: estimated_profit.max(0.0),
        profit_margin: profit_margin.max(0.0),
        fees,
        confidence,
        reasoning,
    }
}

pub fn average_sold_price(comparables: &[Comparable]) -> f64 {
    if comparables.is_empty() {
        return 0.0;
    }
    comparables.iter().map(|c| c.sold_price).sum::<f64>() / comparables.len() as f64
}

/// Marketplace percentage, capped shipping and a flat handling fee.
pub fn fee_breakdown(avg_sold_price: f64, schedule: &FeeSchedule) -> Fees {
    Fees {
        marketplace: avg_sold_price * schedule.marketplace_rate,
        shipping: (avg_sold_price * schedule.shipping_rate).min(schedule.shipping_cap),
        other: schedule.other_flat,
    }
}

/// Relative spread of sold prices: (max - min) / mean. Zero when the mean is zero.
pub fn price_variance(comparables: &[Comparable], avg_sold_price: f64) -> f64 {
    if comparables.is_empty() || avg_sold_price <= 0.0 {
        return 0.0;
    }
    let (min, max) = comparables.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c.sold_price), hi.max(c.sold_price))
    });
    (max - min) / avg_sold_price
}

/// ≥5 comparables → high, ≥3 → medium, else low; one level down when the
/// spread exceeds `variance_threshold`.
pub fn assess_confidence(
    comparables: &[Comparable],
    avg_sold_price: f64,
    variance_threshold: f64,
) -> Confidence {
    let base = match comparables.len() {
        n if n >= 5 => Confidence::High,
        n if n >= 3 => Confidence::Medium,
        _ => Confidence::Low,
    };

    if price_variance(comparables, avg_sold_price) > variance_threshold {
        base.demoted()
    } else {
        base
    }
}

fn confidence_note(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "Strong market data with consistent pricing.",
        Confidence::Medium => "Moderate market data, prices may vary.",
        Confidence::Low => "Limited market data, proceed with caution.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{comparables, listing};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_five_consistent_comparables() {
        let cfg = EngineConfig::default();
        let l = listing("1", 100.0);
        let comps = comparables(&[180.0, 190.0, 200.0, 210.0, 220.0]);

        let a = compute_profit_analysis(&l, &comps, &cfg);

        assert!(approx(a.estimated_sale_price, 200.0));
        assert!(approx(a.fees.marketplace, 26.0));
        assert!(approx(a.fees.shipping, 20.0));
        assert!(approx(a.fees.other, 5.0));
        assert!(approx(a.estimated_profit, 49.0));
        assert!(approx(a.profit_margin, 49.0));
        assert_eq!(a.confidence, Confidence::High);
        assert_eq!(
            a.reasoning,
            "Based on 5 recent comparable sales averaging $200.00. Strong market data with consistent pricing."
        );
    }

    #[test]
    fn test_no_comparables_fallback() {
        let a = compute_profit_analysis(&listing("1", 40.0), &[], &EngineConfig::default());

        assert_eq!(a.estimated_sale_price, 60.0);
        assert_eq!(a.estimated_profit, 0.0);
        assert_eq!(a.profit_margin, 0.0);
        assert_eq!(a.fees, Fees::default());
        assert_eq!(a.confidence, Confidence::Low);
        assert_eq!(a.reasoning, NO_COMPARABLES_REASONING);
    }

    #[test]
    fn test_zero_price_listing_has_zero_margin() {
        let a = compute_profit_analysis(
            &listing("1", 0.0),
            &comparables(&[100.0, 110.0, 90.0]),
            &EngineConfig::default(),
        );
        assert_eq!(a.profit_margin, 0.0);
        assert!(a.estimated_profit > 0.0);
    }

    #[test]
    fn test_loss_is_floored_at_zero() {
        let a = compute_profit_analysis(
            &listing("1", 500.0),
            &comparables(&[100.0, 100.0, 100.0]),
            &EngineConfig::default(),
        );
        assert_eq!(a.estimated_profit, 0.0);
        assert_eq!(a.profit_margin, 0.0);
        assert_eq!(a.confidence, Confidence::Medium);
    }

    #[test]
    fn test_shipping_is_capped() {
        let fees = fee_breakdown(1_000.0, &FeeSchedule::default());
        assert_eq!(fees.shipping, 25.0);
        assert!(approx(fees.marketplace, 130.0));
    }

    #[test]
    fn test_high_variance_demotes_one_level() {
        let cfg = EngineConfig::default();
        let wide5 = comparables(&[100.0, 100.0, 100.0, 100.0, 200.0]);
        let wide3 = comparables(&[100.0, 150.0, 200.0]);
        let wide2 = comparables(&[100.0, 300.0]);

        assert_eq!(compute_profit_analysis(&listing("1", 50.0), &wide5, &cfg).confidence, Confidence::Medium);
        assert_eq!(compute_profit_analysis(&listing("1", 50.0), &wide3, &cfg).confidence, Confidence::Low);
        assert_eq!(compute_profit_analysis(&listing("1", 50.0), &wide2, &cfg).confidence, Confidence::Low);
    }

    #[test]
    fn test_confidence_never_rises_with_variance() {
        fn rank(c: Confidence) -> u8 {
            match c {
                Confidence::High => 2,
                Confidence::Medium => 1,
                Confidence::Low => 0,
            }
        }

        let cfg = EngineConfig::default();
        for count in 1..=7usize {
            let mut prev = u8::MAX;
            for step in 0..10 {
                let spread = step as f64 * 10.0;
                let prices: Vec<f64> = (0..count)
                    .map(|i| if i == 0 { 100.0 + spread } else { 100.0 })
                    .collect();
                let c = compute_profit_analysis(&listing("1", 20.0), &comparables(&prices), &cfg).confidence;
                assert!(rank(c) <= prev, "count={} spread={}", count, spread);
                prev = rank(c);
            }
        }
    }

    #[test]
    fn test_all_zero_sold_prices_do_not_demote() {
        let zeros = comparables(&[0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(price_variance(&zeros, 0.0), 0.0);
        assert_eq!(assess_confidence(&zeros, 0.0, 0.3), Confidence::High);
    }

    #[test]
    fn test_custom_fee_schedule() {
        let cfg = EngineConfig {
            fees: FeeSchedule {
                marketplace_rate: 0.0,
                shipping_rate: 0.0,
                shipping_cap: 0.0,
                other_flat: 0.0,
            },
            ..EngineConfig::default()
        };
        let a = compute_profit_analysis(&listing("1", 100.0), &comparables(&[150.0]), &cfg);
        assert_eq!(a.estimated_profit, 50.0);
        assert_eq!(a.profit_margin, 50.0);
    }
}
