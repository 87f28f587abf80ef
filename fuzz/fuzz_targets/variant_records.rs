#![no_main]

use abverdict::experiment::{analyze, AnalysisConfig, ConfidenceLevel, Objective, VariantRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any record array that parses must analyze without panicking
    let Ok(variants) = serde_json::from_slice::<Vec<VariantRecord>>(data) else {
        return;
    };

    for objective in Objective::ALL {
        if let Ok(result) = analyze(
            &variants,
            objective,
            ConfidenceLevel::P90,
            &AnalysisConfig::default(),
        ) {
            assert!(result
                .comparisons
                .iter()
                .all(|c| c.z_score.is_finite() && c.lift_percent.is_finite()));
            for v in &result.variants {
                let m = &v.metrics;
                for value in [v.primary_metric, m.spend, m.ctr, m.cpc, m.cpm, m.cpa, m.roas, m.conversion_rate] {
                    assert!(value.is_finite() && value >= 0.0);
                }
            }
        }
    }
});
