//! JSON output format for experiment analyses
//!
//! Values are rounded for display only (z-score 3 dp, p-value 4 dp, lift and
//! currency 2 dp, rates 4 dp); `AnalysisResult` keeps full precision.

use crate::experiment::{
    AnalysisResult, ComparisonResult, ConversionShortfall, RecommendedAction, VariantMetrics,
};
use serde::{Deserialize, Serialize};

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Leader summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonLeader {
    pub id: String,
    pub name: String,
    pub primary_metric: f64,
}

/// One ranked variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonVariant {
    pub id: String,
    pub name: String,
    pub primary_metric: f64,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub reach: u64,
    pub conversions: u64,
    /// Percent
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub cpa: f64,
    pub roas: f64,
    /// Percent
    pub conversion_rate: f64,
}

/// One side of a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonComparedVariant {
    pub id: String,
    pub name: String,
    pub value: f64,
}

/// Leader vs challenger test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonComparison {
    pub variant_a: JsonComparedVariant,
    pub variant_b: JsonComparedVariant,
    pub z_score: f64,
    pub p_value: f64,
    pub significant: bool,
    pub lift_percent: f64,
    pub interpretation: String,
}

/// Recommendation block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRecommendation {
    pub action: RecommendedAction,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub loser_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub needed: Vec<ConversionShortfall>,
}

/// Complete JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAnalysisReport {
    pub test_objective: String,
    pub objective_label: String,
    pub direction: String,
    pub confidence_level: u32,
    pub confidence_description: String,
    pub z_threshold: f64,
    pub status: String,
    pub status_label: String,
    pub leader: JsonLeader,
    pub variants: Vec<JsonVariant>,
    pub comparisons: Vec<JsonComparison>,
    pub recommendation: JsonRecommendation,
    pub sufficient_data: bool,
}

impl From<&VariantMetrics> for JsonVariant {
    fn from(v: &VariantMetrics) -> Self {
        let m = &v.metrics;
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            primary_metric: round_to(v.primary_metric, 4),
            spend: round_to(m.spend, 2),
            impressions: m.impressions,
            clicks: m.clicks,
            reach: m.reach,
            conversions: m.conversions,
            ctr: round_to(m.ctr, 4),
            cpc: round_to(m.cpc, 2),
            cpm: round_to(m.cpm, 2),
            cpa: round_to(m.cpa, 2),
            roas: round_to(m.roas, 2),
            conversion_rate: round_to(m.conversion_rate, 4),
        }
    }
}

impl From<&ComparisonResult> for JsonComparison {
    fn from(c: &ComparisonResult) -> Self {
        let side = |id: &str, name: &str, value: f64| JsonComparedVariant {
            id: id.to_string(),
            name: name.to_string(),
            value: round_to(value, 4),
        };
        Self {
            variant_a: side(&c.variant_a.id, &c.variant_a.name, c.variant_a.value),
            variant_b: side(&c.variant_b.id, &c.variant_b.name, c.variant_b.value),
            z_score: round_to(c.z_score, 3),
            p_value: round_to(c.p_value, 4),
            significant: c.significant,
            lift_percent: round_to(c.lift_percent, 2),
            interpretation: c.interpretation.clone(),
        }
    }
}

impl JsonAnalysisReport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let rec = &result.recommendation;
        Self {
            test_objective: result.objective.key().to_string(),
            objective_label: result.objective_label.clone(),
            direction: result.direction.as_str().to_string(),
            confidence_level: result.confidence_level.percent(),
            confidence_description: result.confidence_level.description().to_string(),
            z_threshold: result.z_threshold,
            status: result.status.as_str().to_string(),
            status_label: result.status_label.clone(),
            leader: JsonLeader {
                id: result.leader.id.clone(),
                name: result.leader.name.clone(),
                primary_metric: round_to(result.leader.primary_metric, 4),
            },
            variants: result.variants.iter().map(JsonVariant::from).collect(),
            comparisons: result.comparisons.iter().map(JsonComparison::from).collect(),
            recommendation: JsonRecommendation {
                action: rec.action,
                message: rec.message.clone(),
                winner_id: rec.winner_id.clone(),
                loser_ids: rec.loser_ids.clone(),
                leader_id: rec.leader_id.clone(),
                needed: rec.needed.clone(),
            },
            sufficient_data: result.sufficient_data,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
