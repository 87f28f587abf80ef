// Manually entered variant totals
//
// For offline analysis of numbers copied out of an ads dashboard: name,
// spend, impressions, clicks and optionally conversions and revenue.

use crate::error::{AnalysisError, Result};
use crate::experiment::analyzer::{analyze, AnalysisResult};
use crate::experiment::config::AnalysisConfig;
use crate::experiment::metrics::VariantRecord;
use crate::experiment::objective::{ConfidenceLevel, Objective};
use serde::{Deserialize, Serialize};

pub const MIN_MANUAL_VARIANTS: usize = 2;
pub const MAX_MANUAL_VARIANTS: usize = 5;

/// Totals for one variant as typed in by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualVariant {
    pub name: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub revenue: f64,
}

impl ManualVariant {
    /// Convert into a variant record with a positional id (`variant_a`, ...)
    pub fn to_record(&self, index: usize) -> VariantRecord {
        let cpa = if self.conversions > 0 {
            self.spend / self.conversions as f64
        } else {
            0.0
        };
        let roas = if self.spend > 0.0 && self.revenue > 0.0 {
            self.revenue / self.spend
        } else {
            0.0
        };

        VariantRecord {
            cpa: Some(cpa.into()),
            roas: Some(roas.into()),
            revenue: Some(self.revenue.into()),
            ..VariantRecord::new(&positional_id(index), &self.name)
                .with_totals(self.spend, self.impressions, self.clicks)
                .with_conversions(self.conversions)
        }
    }
}

fn positional_id(index: usize) -> String {
    // 'a'..='z' covers far more than MAX_MANUAL_VARIANTS
    let letter = char::from(b'a' + (index % 26) as u8);
    format!("variant_{}", letter)
}

/// Analyze 2 to 5 manually entered variants
pub fn analyze_manual(
    variants: &[ManualVariant],
    objective: Objective,
    confidence_level: ConfidenceLevel,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    if !(MIN_MANUAL_VARIANTS..=MAX_MANUAL_VARIANTS).contains(&variants.len()) {
        return Err(AnalysisError::InvalidInput(format!(
            "manual analysis needs {} to {} variants, got {}",
            MIN_MANUAL_VARIANTS,
            MAX_MANUAL_VARIANTS,
            variants.len()
        )));
    }

    let records: Vec<VariantRecord> = variants
        .iter()
        .enumerate()
        .map(|(i, v)| v.to_record(i))
        .collect();

    analyze(&records, objective, confidence_level, config)
}
