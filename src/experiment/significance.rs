// Pairwise significance testing between the leading variant and a challenger
//
// Two closed-form large-sample z-tests:
// - Proportion test for rates (ctr over impressions, conversion_rate over clicks)
// - Mean test for cost and return metrics, with a heuristic standard deviation
//
// p-values are two-tailed, using the Abramowitz & Stegun 7.1.26 rational
// approximation of erf (max error ~7.5e-8). All functions are total: degenerate
// inputs produce z = 0, p = 1.

use crate::experiment::metrics::CanonicalMetrics;
use crate::experiment::objective::{Objective, TestFamily};
use serde::{Deserialize, Serialize};

const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Standard normal CDF
pub fn normal_cdf(z: f64) -> f64 {
    if z < -6.0 {
        return 0.0;
    }
    if z > 6.0 {
        return 1.0;
    }

    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    let erf = 1.0 - poly * (-x * x).exp();

    0.5 * (1.0 + sign * erf)
}

/// Two-tailed p-value for a z statistic
pub fn two_tailed_p_value(z: f64) -> f64 {
    if z == 0.0 || !z.is_finite() {
        return 1.0;
    }
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// z statistic for the difference of two proportions (pooled variance)
///
/// `p1`/`p2` are fractions in [0, 1]; `n1`/`n2` the trial counts.
pub fn z_score_proportions(p1: f64, n1: f64, p2: f64, n2: f64) -> f64 {
    if n1 <= 0.0 || n2 <= 0.0 {
        return 0.0;
    }
    let p_pool = (p1 * n1 + p2 * n2) / (n1 + n2);
    let se = (p_pool * (1.0 - p_pool) * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 || !se.is_finite() {
        return 0.0;
    }
    (p1 - p2) / se
}

/// z statistic for the difference of two means
pub fn z_score_means(mean1: f64, n1: f64, std1: f64, mean2: f64, n2: f64, std2: f64) -> f64 {
    if n1 <= 0.0 || n2 <= 0.0 {
        return 0.0;
    }
    let se = ((std1 * std1) / n1 + (std2 * std2) / n2).sqrt();
    if se == 0.0 || !se.is_finite() {
        return 0.0;
    }
    (mean1 - mean2) / se
}

/// Canonical metrics of one variant, with its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMetrics {
    pub id: String,
    pub name: String,
    /// Value of the analysis objective for this variant
    pub primary_metric: f64,
    #[serde(flatten)]
    pub metrics: CanonicalMetrics,
}

/// Identity and objective value of one side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedVariant {
    pub id: String,
    pub name: String,
    pub value: f64,
}

impl From<&VariantMetrics> for ComparedVariant {
    fn from(v: &VariantMetrics) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            value: v.primary_metric,
        }
    }
}

/// Result of testing the leader against one challenger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Always the current leader
    pub variant_a: ComparedVariant,
    pub variant_b: ComparedVariant,
    pub z_score: f64,
    pub p_value: f64,
    pub significant: bool,
    /// (leader - challenger) / |challenger| in percent
    pub lift_percent: f64,
    pub interpretation: String,
}

/// Parameters shared by every comparison of one analysis
#[derive(Debug, Clone, Copy)]
pub struct TestParameters {
    pub objective: Objective,
    pub z_threshold: f64,
    pub std_dev_ratio: f64,
}

fn proportion_z(a: &VariantMetrics, b: &VariantMetrics, objective: Objective) -> f64 {
    let (n_a, n_b) = match objective {
        Objective::Ctr => (a.metrics.impressions, b.metrics.impressions),
        _ => (a.metrics.clicks, b.metrics.clicks),
    };
    z_score_proportions(
        a.primary_metric / 100.0,
        n_a as f64,
        b.primary_metric / 100.0,
        n_b as f64,
    )
}

fn mean_z(a: &VariantMetrics, b: &VariantMetrics, std_dev_ratio: f64) -> f64 {
    // A zero mean has no observable spread; fall back to unit deviation
    let std_of = |mean: f64| {
        let std = (mean * std_dev_ratio).abs();
        if std > 0.0 {
            std
        } else {
            1.0
        }
    };
    let n_of = |m: &CanonicalMetrics| m.effective_sample().max(1) as f64;

    z_score_means(
        a.primary_metric,
        n_of(&a.metrics),
        std_of(a.primary_metric),
        b.primary_metric,
        n_of(&b.metrics),
        std_of(b.primary_metric),
    )
}

fn lift_percent(leader: f64, challenger: f64) -> f64 {
    if leader == 0.0 || challenger == 0.0 {
        return 0.0;
    }
    let lift = (leader - challenger) / challenger.abs() * 100.0;
    if lift.is_finite() {
        lift
    } else {
        0.0
    }
}

fn interpret(
    leader: &VariantMetrics,
    challenger: &VariantMetrics,
    objective: Objective,
    significant: bool,
    p_value: f64,
) -> String {
    if significant {
        let comparison = if objective.direction().is_higher_better() {
            "higher"
        } else {
            "lower"
        };
        format!(
            "{} has a {} {} than {} (significant, p={:.4})",
            leader.name,
            comparison,
            objective.label(),
            challenger.name,
            p_value
        )
    } else {
        format!(
            "No statistically significant difference between {} and {} (p={:.4})",
            leader.name, challenger.name, p_value
        )
    }
}

/// Test the leader against one challenger on the analysis objective
///
/// Never fails: zero sample sizes or zero variance yield z = 0, p = 1,
/// `significant = false`.
pub fn compare_to_leader(
    leader: &VariantMetrics,
    challenger: &VariantMetrics,
    params: &TestParameters,
) -> ComparisonResult {
    let z_score = match params.objective.test_family() {
        TestFamily::Proportion => proportion_z(leader, challenger, params.objective),
        TestFamily::Mean => mean_z(leader, challenger, params.std_dev_ratio),
    };
    let z_score = if z_score.is_finite() { z_score } else { 0.0 };

    let p_value = two_tailed_p_value(z_score);
    let significant = z_score.abs() >= params.z_threshold;

    tracing::debug!(
        "{} vs {}: z={:.3}, p={:.4}, significant={}",
        leader.id,
        challenger.id,
        z_score,
        p_value,
        significant
    );

    ComparisonResult {
        variant_a: leader.into(),
        variant_b: challenger.into(),
        z_score,
        p_value,
        significant,
        lift_percent: lift_percent(leader.primary_metric, challenger.primary_metric),
        interpretation: interpret(leader, challenger, params.objective, significant, p_value),
    }
}
