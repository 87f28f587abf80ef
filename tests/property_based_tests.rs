//! Property-based tests for the significance engine
//!
//! Core properties:
//! 1. Totality: any well-formed counters produce a finite, complete result
//! 2. Determinism: identical inputs give identical output
//! 3. Leader invariant: the leader holds the best objective value
//! 4. Symmetry: swapping leader and challenger negates z and keeps p
//! 5. Monotonicity: more data behind the same rate gap never lowers |z|
//! 6. Precondition: fewer than two variants is always rejected
//! 7. Hostile amounts (negative, huge, NaN) still give finite non-negative metrics

use abverdict::experiment::{
    analyze, compare_to_leader, extract_metrics, AnalysisConfig, ConfidenceLevel, Direction,
    Objective, TestParameters, VariantMetrics, VariantRecord,
};
use abverdict::AnalysisError;
use proptest::prelude::*;

fn objective_strategy() -> impl Strategy<Value = Objective> {
    prop::sample::select(Objective::ALL.to_vec())
}

fn confidence_strategy() -> impl Strategy<Value = ConfidenceLevel> {
    prop::sample::select(ConfidenceLevel::ALL.to_vec())
}

/// Counters with clicks <= impressions and conversions <= clicks
fn record_strategy() -> impl Strategy<Value = VariantRecord> {
    (0u64..500_000, 0.0f64..100_000.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..50.0)
        .prop_map(|(impressions, spend, click_share, conv_share, roas)| {
            let clicks = (impressions as f64 * click_share * 0.1).floor() as u64;
            let conversions = (clicks as f64 * conv_share * 0.2).floor() as u64;
            VariantRecord {
                roas: Some(roas.into()),
                ..VariantRecord::new("", "")
                    .with_totals(spend, impressions, clicks)
                    .with_conversions(conversions)
            }
        })
}

/// Raw amounts anywhere in the f64 range, including negatives, NaN and infinities
fn raw_record_strategy() -> impl Strategy<Value = VariantRecord> {
    prop::collection::vec(any::<f64>(), 8).prop_map(|v| VariantRecord {
        spend: Some(v[0].into()),
        impressions: Some(v[1].into()),
        clicks: Some(v[2].into()),
        conversions: Some(v[3].into()),
        revenue: Some(v[4].into()),
        ctr: Some(v[5].into()),
        cpc: Some(v[6].into()),
        cpm: Some(v[7].into()),
        ..VariantRecord::new("", "")
    })
}

fn variants_strategy() -> impl Strategy<Value = Vec<VariantRecord>> {
    prop::collection::vec(record_strategy(), 2..7).prop_map(|mut records| {
        for (i, r) in records.iter_mut().enumerate() {
            r.id = format!("v{}", i);
            r.name = format!("Variant {}", i);
        }
        records
    })
}

fn as_variant(id: &str, record: &VariantRecord, objective: Objective) -> VariantMetrics {
    let metrics = extract_metrics(record);
    VariantMetrics {
        id: id.to_string(),
        name: id.to_string(),
        primary_metric: metrics.objective_value(objective),
        metrics,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_analysis_is_total_and_finite(
        variants in variants_strategy(),
        objective in objective_strategy(),
        confidence in confidence_strategy(),
    ) {
        let result = analyze(&variants, objective, confidence, &AnalysisConfig::default()).unwrap();

        prop_assert_eq!(result.variants.len(), variants.len());
        prop_assert_eq!(result.comparisons.len(), variants.len() - 1);
        for v in &result.variants {
            let m = &v.metrics;
            for value in [v.primary_metric, m.spend, m.ctr, m.cpc, m.cpm, m.cpa, m.roas, m.conversion_rate] {
                prop_assert!(value.is_finite());
            }
        }
        for c in &result.comparisons {
            prop_assert!(c.z_score.is_finite());
            prop_assert!((0.0..=1.0).contains(&c.p_value));
            prop_assert!(c.lift_percent.is_finite());
            prop_assert_eq!(c.significant, c.z_score.abs() >= confidence.z_threshold());
        }
    }

    #[test]
    fn prop_extreme_amounts_yield_finite_non_negative_metrics(
        records in prop::collection::vec(raw_record_strategy(), 2..5),
        objective in objective_strategy(),
    ) {
        let result = analyze(&records, objective, ConfidenceLevel::P90, &AnalysisConfig::default()).unwrap();

        for v in &result.variants {
            let m = &v.metrics;
            for value in [v.primary_metric, m.spend, m.ctr, m.cpc, m.cpm, m.cpa, m.roas, m.conversion_rate] {
                prop_assert!(value.is_finite() && value >= 0.0, "{} in {:?}", value, m);
            }
        }
        for c in &result.comparisons {
            prop_assert!(c.z_score.is_finite());
            prop_assert!(c.lift_percent.is_finite());
        }
        let json = serde_json::to_value(&result).unwrap();
        prop_assert!(json["variants"].as_array().unwrap().iter().all(|v| v["primary_metric"].is_f64()));
    }

    #[test]
    fn prop_analysis_is_deterministic(
        variants in variants_strategy(),
        objective in objective_strategy(),
    ) {
        let config = AnalysisConfig::default();
        let first = analyze(&variants, objective, ConfidenceLevel::P90, &config).unwrap();
        let second = analyze(&variants, objective, ConfidenceLevel::P90, &config).unwrap();

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn prop_leader_holds_best_metric(
        variants in variants_strategy(),
        objective in objective_strategy(),
    ) {
        let result = analyze(&variants, objective, ConfidenceLevel::P90, &AnalysisConfig::default()).unwrap();
        let values = result.variants.iter().map(|v| v.primary_metric);
        let best = match objective.direction() {
            Direction::HigherBetter => values.fold(f64::NEG_INFINITY, f64::max),
            Direction::LowerBetter => values.fold(f64::INFINITY, f64::min),
        };

        prop_assert_eq!(result.leader.primary_metric, best);
        prop_assert_eq!(&result.leader.id, &result.variants[0].id);
        for c in &result.comparisons {
            prop_assert_eq!(&c.variant_a.id, &result.leader.id);
        }
    }

    #[test]
    fn prop_swapping_sides_is_symmetric(
        a in record_strategy(),
        b in record_strategy(),
        objective in objective_strategy(),
    ) {
        let a = as_variant("a", &a, objective);
        let b = as_variant("b", &b, objective);
        let params = TestParameters { objective, z_threshold: 1.645, std_dev_ratio: 0.3 };

        let ab = compare_to_leader(&a, &b, &params);
        let ba = compare_to_leader(&b, &a, &params);

        prop_assert!((ab.z_score + ba.z_score).abs() <= 1e-9 * ab.z_score.abs().max(1.0));
        prop_assert!((ab.p_value - ba.p_value).abs() < 1e-12);
        prop_assert_eq!(ab.significant, ba.significant);
        prop_assert!(ab.lift_percent * ba.lift_percent <= 0.0);
    }

    #[test]
    fn prop_more_data_never_weakens_proportion_test(
        leader_impressions in 10_000u64..200_000,
        leader_clicks in 100u64..4_000,
        challenger_impressions in 10_000u64..100_000,
        rate_ratio in 0.1f64..0.9,
        scale in 2u64..10,
    ) {
        let leader_rate = leader_clicks as f64 / leader_impressions as f64;
        let challenger_clicks = (challenger_impressions as f64 * leader_rate * rate_ratio).floor() as u64;

        let leader = VariantRecord::new("l", "Leader").with_totals(1000.0, leader_impressions, leader_clicks);
        let small = VariantRecord::new("c", "Challenger")
            .with_totals(1000.0, challenger_impressions, challenger_clicks);
        let large = VariantRecord::new("c", "Challenger")
            .with_totals(1000.0, challenger_impressions * scale, challenger_clicks * scale);

        let params = TestParameters { objective: Objective::Ctr, z_threshold: 1.645, std_dev_ratio: 0.3 };
        let leader = as_variant("l", &leader, Objective::Ctr);
        let z_small = compare_to_leader(&leader, &as_variant("c", &small, Objective::Ctr), &params).z_score;
        let z_large = compare_to_leader(&leader, &as_variant("c", &large, Objective::Ctr), &params).z_score;

        prop_assert!(z_large.abs() >= z_small.abs() * (1.0 - 1e-9), "{} < {}", z_large, z_small);
    }

    #[test]
    fn prop_single_variant_rejected(
        record in record_strategy(),
        objective in objective_strategy(),
    ) {
        let result = analyze(&[record], objective, ConfidenceLevel::P90, &AnalysisConfig::default());
        prop_assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }
}
