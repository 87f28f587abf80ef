// Statistical significance engine for advertising A/B experiments
//
// Given per-variant performance counters, decides whether one variant
// outperforms the others on a business objective and recommends scaling the
// winner, continuing the test, or stopping.
//
// Pipeline:
// - metrics:      normalize flat or nested insights records into canonical metrics
// - significance: leader vs challenger z-tests (proportion or mean family)
// - analyzer:     rank, test, classify status, derive recommendation
//
// Large-sample normal approximation only; no exact small-sample tests and no
// multiple-comparison correction beyond pairwise testing against the leader.
// Every analysis is a pure function of its inputs and the static tables in
// `objective`, so concurrent callers need no coordination.

mod analyzer;
mod config;
mod demo;
mod manual;
mod metrics;
mod objective;
mod significance;

pub use analyzer::{
    analyze, analyze_experiment, AnalysisResult, ConversionShortfall, ExperimentStatus, Leader,
    Recommendation, RecommendedAction,
};
pub use config::{AnalysisConfig, DEFAULT_MIN_CONVERSIONS, DEFAULT_STD_DEV_RATIO};
pub use demo::{generate_demo_variants, DEMO_REVENUE_PER_CONVERSION};
pub use manual::{analyze_manual, ManualVariant, MAX_MANUAL_VARIANTS, MIN_MANUAL_VARIANTS};
pub use metrics::{
    extract_metrics, ActionValue, CanonicalMetrics, NumericValue, VariantRecord,
    CONVERSION_ACTION_TYPES,
};
pub use objective::{ConfidenceLevel, Direction, Objective, TestFamily};
pub use significance::{
    compare_to_leader, normal_cdf, two_tailed_p_value, z_score_means, z_score_proportions,
    ComparedVariant, ComparisonResult, TestParameters, VariantMetrics,
};
