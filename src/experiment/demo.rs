//! Synthetic variant data for demos and smoke tests
//!
//! Produces records in the ads-insights shape, numbers serialized as strings.
//! The first variant is the baseline; the others get a random conversion
//! multiplier in [0.7, 1.3).

use crate::experiment::metrics::{NumericValue, VariantRecord};
use rand::Rng;

/// Revenue per conversion assumed when deriving demo ROAS
pub const DEMO_REVENUE_PER_CONVERSION: f64 = 5000.0;

fn text(value: f64, decimals: usize) -> Option<NumericValue> {
    Some(NumericValue::Text(format!("{:.*}", decimals, value)))
}

/// `A`..`Z`, then `A2`..`Z2`, `A3`, ...
fn positional_label(index: usize) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    match index / 26 {
        0 => letter.to_string(),
        round => format!("{}{}", letter, round + 1),
    }
}

/// Generate `count` demo variants named `Variant A`, `Variant B`, ...
pub fn generate_demo_variants<R: Rng>(count: usize, rng: &mut R) -> Vec<VariantRecord> {
    (0..count)
        .map(|i| {
            let label = positional_label(i);
            let multiplier: f64 = if i == 0 {
                1.0
            } else {
                rng.gen_range(0.7..1.3)
            };
            let spend: f64 = rng.gen_range(15_000.0..25_000.0);
            let impressions: f64 = rng.gen_range(40_000.0..70_000.0);
            let click_rate: f64 = rng.gen_range(0.008..0.023);
            let conversion_rate: f64 = rng.gen_range(0.02..0.07);
            let clicks = impressions * click_rate;
            let conversions = (clicks * conversion_rate * multiplier).floor();

            let (cpa, roas) = if conversions > 0.0 {
                (
                    spend / conversions,
                    conversions * DEMO_REVENUE_PER_CONVERSION / spend,
                )
            } else {
                (0.0, 0.0)
            };

            VariantRecord {
                id: format!("demo_variant_{}", label.to_ascii_lowercase()),
                name: format!("Variant {}", label),
                spend: text(spend.round(), 0),
                impressions: text(impressions.round(), 0),
                clicks: text(clicks.round(), 0),
                reach: text((impressions * 0.7).round(), 0),
                conversions: Some(NumericValue::Number(conversions)),
                ctr: text(clicks / impressions * 100.0, 2),
                cpc: text(spend / clicks, 2),
                cpa: text(cpa, 2),
                roas: text(roas, 2),
                ..VariantRecord::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::metrics::extract_metrics;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generates_named_variants() {
        let mut rng = StdRng::seed_from_u64(7);
        let variants = generate_demo_variants(3, &mut rng);

        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0].id, "demo_variant_a");
        assert_eq!(variants[2].name, "Variant C");
    }

    #[test]
    fn test_values_within_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for record in generate_demo_variants(5, &mut rng) {
            let m = extract_metrics(&record);
            assert!((15_000.0..=25_000.0).contains(&m.spend));
            assert!((40_000..=70_000).contains(&m.impressions));
            assert!(m.clicks > 0 && m.clicks < m.impressions);
            assert!(m.conversions <= m.clicks);
            assert!(m.ctr > 0.7 && m.ctr < 2.4);
        }
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = generate_demo_variants(4, &mut StdRng::seed_from_u64(99));
        let b = generate_demo_variants(4, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_ids_stay_unique_past_z() {
        let variants = generate_demo_variants(60, &mut StdRng::seed_from_u64(3));
        let ids: std::collections::HashSet<_> = variants.iter().map(|v| v.id.as_str()).collect();

        assert_eq!(ids.len(), 60);
        assert_eq!(variants[25].id, "demo_variant_z");
        assert_eq!(variants[26].id, "demo_variant_a2");
        assert_eq!(variants[26].name, "Variant A2");
        assert_eq!(variants[53].id, "demo_variant_b3");
    }

    #[test]
    fn test_zero_count() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_demo_variants(0, &mut rng).is_empty());
    }
}
