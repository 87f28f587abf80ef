// Experiment analysis: rank variants, test the leader against each challenger,
// classify the outcome and derive an actionable recommendation.
//
// Status precedence (first match wins):
//   all comparisons significant AND every variant has enough data -> WinnerFound
//   any comparison significant                                   -> PartialSignificance
//   some variant below the sample floor                           -> InsufficientData
//   otherwise                                                     -> NoSignificantDifference

use crate::error::{AnalysisError, Result};
use crate::experiment::config::AnalysisConfig;
use crate::experiment::metrics::{extract_metrics, VariantRecord};
use crate::experiment::objective::{ConfidenceLevel, Direction, Objective};
use crate::experiment::significance::{
    compare_to_leader, ComparisonResult, TestParameters, VariantMetrics,
};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    WinnerFound,
    PartialSignificance,
    InsufficientData,
    NoSignificantDifference,
}

impl ExperimentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperimentStatus::WinnerFound => "winner_found",
            ExperimentStatus::PartialSignificance => "partial_significance",
            ExperimentStatus::InsufficientData => "insufficient_data",
            ExperimentStatus::NoSignificantDifference => "no_significant_difference",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExperimentStatus::WinnerFound => "Winner found - statistically significant",
            ExperimentStatus::PartialSignificance => {
                "Partially significant - keep the test running"
            }
            ExperimentStatus::InsufficientData => "Insufficient data - keep the test running",
            ExperimentStatus::NoSignificantDifference => {
                "No significant difference - variants may perform alike"
            }
        }
    }
}

/// Action the caller should take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    ScaleWinner,
    ContinueTest,
    NoAction,
}

/// Conversions still missing for one variant to reach the sample floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionShortfall {
    pub id: String,
    pub name: String,
    pub current_conversions: u64,
    pub needed: u64,
}

/// Recommendation derived from the experiment status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loser_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needed: Vec<ConversionShortfall>,
}

impl Recommendation {
    fn new(action: RecommendedAction, message: String) -> Self {
        Self {
            action,
            message,
            winner_id: None,
            loser_ids: Vec::new(),
            leader_id: None,
            needed: Vec::new(),
        }
    }
}

/// The variant currently ranked best on the objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub id: String,
    pub name: String,
    pub primary_metric: f64,
}

/// Complete outcome of one experiment analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub objective: Objective,
    pub objective_label: String,
    pub direction: Direction,
    pub confidence_level: ConfidenceLevel,
    pub z_threshold: f64,
    pub status: ExperimentStatus,
    pub status_label: String,
    pub leader: Leader,
    /// Ranked best first
    pub variants: Vec<VariantMetrics>,
    pub comparisons: Vec<ComparisonResult>,
    pub recommendation: Recommendation,
    pub sufficient_data: bool,
}

impl AnalysisResult {
    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        match self.status {
            ExperimentStatus::WinnerFound => report.push_str("✅ WINNER FOUND\n\n"),
            ExperimentStatus::PartialSignificance => {
                report.push_str("⚠️  PARTIAL SIGNIFICANCE\n\n")
            }
            ExperimentStatus::InsufficientData => report.push_str("⚠️  INSUFFICIENT DATA\n\n"),
            ExperimentStatus::NoSignificantDifference => {
                report.push_str("➖ NO SIGNIFICANT DIFFERENCE\n\n")
            }
        }

        report.push_str(&format!(
            "Objective: {} ({})\n",
            self.objective_label,
            self.direction.as_str()
        ));
        report.push_str(&format!(
            "Confidence: {}% (|z| >= {})\n",
            self.confidence_level.percent(),
            self.z_threshold
        ));
        report.push_str(&format!(
            "Leader: {} ({:.2})\n",
            self.leader.name, self.leader.primary_metric
        ));

        report.push_str("\n📊 Variants:\n");
        for v in &self.variants {
            report.push_str(&format!(
                "  {} [{}]: {}={:.2}, spend={:.2}, impressions={}, clicks={}, conversions={}\n",
                v.name,
                v.id,
                self.objective.key(),
                v.primary_metric,
                v.metrics.spend,
                v.metrics.impressions,
                v.metrics.clicks,
                v.metrics.conversions
            ));
        }

        if !self.comparisons.is_empty() {
            report.push_str("\n🔬 Comparisons vs leader:\n");
            for c in &self.comparisons {
                report.push_str(&format!(
                    "  {} vs {}: z={:.3}, p={:.4}, lift={:+.2}% {}\n",
                    c.variant_a.name,
                    c.variant_b.name,
                    c.z_score,
                    c.p_value,
                    c.lift_percent,
                    if c.significant { "✓" } else { "✗" }
                ));
            }
        }

        report.push_str(&format!(
            "\n👉 Recommendation ({}): {}\n",
            match self.recommendation.action {
                RecommendedAction::ScaleWinner => "scale_winner",
                RecommendedAction::ContinueTest => "continue_test",
                RecommendedAction::NoAction => "no_action",
            },
            self.recommendation.message
        ));
        for shortfall in &self.recommendation.needed {
            report.push_str(&format!(
                "  - {}: {} conversions, {} more needed\n",
                shortfall.name, shortfall.current_conversions, shortfall.needed
            ));
        }

        report
    }
}

fn classify(all_significant: bool, any_significant: bool, sufficient_data: bool) -> ExperimentStatus {
    if all_significant && sufficient_data {
        ExperimentStatus::WinnerFound
    } else if any_significant {
        ExperimentStatus::PartialSignificance
    } else if !sufficient_data {
        ExperimentStatus::InsufficientData
    } else {
        ExperimentStatus::NoSignificantDifference
    }
}

fn recommend(
    status: ExperimentStatus,
    ranked: &[VariantMetrics],
    objective: Objective,
    min_conversions: u64,
) -> Recommendation {
    // ranked is never empty: analyze() requires two variants
    let best = &ranked[0];

    match status {
        ExperimentStatus::WinnerFound => Recommendation {
            winner_id: Some(best.id.clone()),
            loser_ids: ranked[1..].iter().map(|v| v.id.clone()).collect(),
            ..Recommendation::new(
                RecommendedAction::ScaleWinner,
                format!(
                    "\"{}\" is the clear winner ({}: {:.2}). Scale its budget and pause the other variants.",
                    best.name,
                    objective.label(),
                    best.primary_metric
                ),
            )
        },
        ExperimentStatus::PartialSignificance => Recommendation {
            leader_id: Some(best.id.clone()),
            ..Recommendation::new(
                RecommendedAction::ContinueTest,
                format!(
                    "Partially significant. \"{}\" is leading, but significance against every variant has not been reached yet; keep the test running.",
                    best.name
                ),
            )
        },
        ExperimentStatus::InsufficientData => Recommendation {
            needed: ranked
                .iter()
                .map(|v| ConversionShortfall {
                    id: v.id.clone(),
                    name: v.name.clone(),
                    current_conversions: v.metrics.conversions,
                    needed: min_conversions.saturating_sub(v.metrics.conversions),
                })
                .collect(),
            ..Recommendation::new(
                RecommendedAction::ContinueTest,
                format!(
                    "Not enough data. Keep the test running until every variant has at least {} conversions.",
                    min_conversions
                ),
            )
        },
        ExperimentStatus::NoSignificantDifference => Recommendation::new(
            RecommendedAction::NoAction,
            "No statistically significant difference. The variants may perform alike; test a different variable or try variations with a larger difference.".to_string(),
        ),
    }
}

/// Analyze an experiment with explicit objective, confidence and configuration
///
/// Fails when fewer than two variants are supplied or the configuration is invalid.
///
/// # Example
/// ```
/// use abverdict::experiment::{
///     analyze, AnalysisConfig, ConfidenceLevel, ExperimentStatus, Objective, VariantRecord,
/// };
///
/// let variants = vec![
///     VariantRecord::new("a", "Variant A").with_totals(20000.0, 100000, 2000).with_conversions(100),
///     VariantRecord::new("b", "Variant B").with_totals(20000.0, 100000, 1000).with_conversions(30),
/// ];
/// let result = analyze(&variants, Objective::Ctr, ConfidenceLevel::P90, &AnalysisConfig::default()).unwrap();
/// assert_eq!(result.leader.id, "a");
/// assert_eq!(result.status, ExperimentStatus::PartialSignificance);
/// ```
pub fn analyze(
    variants: &[VariantRecord],
    objective: Objective,
    confidence_level: ConfidenceLevel,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    if variants.len() < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "at least 2 variants are required, got {}",
            variants.len()
        )));
    }
    config.validate()?;

    let direction = objective.direction();
    let z_threshold = confidence_level.z_threshold();

    // Step 1: canonical metrics per variant
    let mut ranked: Vec<VariantMetrics> = variants
        .iter()
        .map(|record| {
            let metrics = extract_metrics(record);
            tracing::debug!("Extracted metrics for {}: {:?}", record.id, metrics);
            VariantMetrics {
                id: record.id.clone(),
                name: record.name.clone(),
                primary_metric: metrics.objective_value(objective),
                metrics,
            }
        })
        .collect();

    // Step 2: best performer first (stable, so ties keep input order)
    ranked.sort_by(|a, b| match direction {
        Direction::HigherBetter => b.primary_metric.total_cmp(&a.primary_metric),
        Direction::LowerBetter => a.primary_metric.total_cmp(&b.primary_metric),
    });

    // Step 3: leader vs each challenger
    let params = TestParameters {
        objective,
        z_threshold,
        std_dev_ratio: config.std_dev_ratio,
    };
    let leader = &ranked[0];
    let comparisons: Vec<ComparisonResult> = ranked[1..]
        .iter()
        .map(|challenger| compare_to_leader(leader, challenger, &params))
        .collect();

    // Step 4: aggregate
    let all_significant = !comparisons.is_empty() && comparisons.iter().all(|c| c.significant);
    let any_significant = comparisons.iter().any(|c| c.significant);
    let sufficient_data = ranked
        .iter()
        .all(|v| v.metrics.effective_sample() >= config.min_conversions);

    let status = classify(all_significant, any_significant, sufficient_data);
    tracing::info!(
        "Experiment on {} at {}%: {} (leader {})",
        objective,
        confidence_level.percent(),
        status.as_str(),
        leader.id
    );

    let recommendation = recommend(status, &ranked, objective, config.min_conversions);
    let leader = Leader {
        id: leader.id.clone(),
        name: leader.name.clone(),
        primary_metric: leader.primary_metric,
    };

    Ok(AnalysisResult {
        objective,
        objective_label: objective.label().to_string(),
        direction,
        confidence_level,
        z_threshold,
        status,
        status_label: status.label().to_string(),
        leader,
        variants: ranked,
        comparisons,
        recommendation,
        sufficient_data,
    })
}

/// Analyze an experiment from an objective key and optional confidence level
///
/// Unknown objective keys fail with `InvalidInput`; an absent confidence level
/// uses the configured default, an unsupported one falls back to 90%.
pub fn analyze_experiment(
    variants: &[VariantRecord],
    objective_key: &str,
    confidence_level: Option<u32>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    let objective = Objective::from_key(objective_key)?;
    let confidence = confidence_level.map_or(config.confidence_level, ConfidenceLevel::resolve);
    analyze(variants, objective, confidence, config)
}
