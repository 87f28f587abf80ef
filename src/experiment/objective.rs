// Static decision tables: test objectives and confidence-level thresholds
//
// Both tables are immutable and process-wide. Objectives are looked up by
// their wire key ("cost_per_result", "ctr", ...); confidence levels by the
// integer percentage a caller passes in.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way an objective metric improves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl Direction {
    pub fn is_higher_better(self) -> bool {
        matches!(self, Direction::HigherBetter)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::HigherBetter => "higher_better",
            Direction::LowerBetter => "lower_better",
        }
    }
}

/// The metric used to declare a winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Cost per acquisition (`cpa`)
    CostPerResult,
    Ctr,
    ConversionRate,
    Roas,
    Cpc,
    Cpm,
}

/// Statistical family used to compare two variants on an objective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestFamily {
    /// Binomial proportion (rates expressed in percent)
    Proportion,
    /// Sample mean with heuristic standard deviation
    Mean,
}

impl Objective {
    pub const ALL: [Objective; 6] = [
        Objective::CostPerResult,
        Objective::Ctr,
        Objective::ConversionRate,
        Objective::Roas,
        Objective::Cpc,
        Objective::Cpm,
    ];

    /// Look up an objective by its key
    ///
    /// Unknown keys are a caller error and surface as `InvalidInput`.
    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|o| o.key() == key)
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "unknown test objective '{}' (expected one of: {})",
                    key,
                    Self::ALL.map(|o| o.key()).join(", ")
                ))
            })
    }

    pub fn key(self) -> &'static str {
        match self {
            Objective::CostPerResult => "cost_per_result",
            Objective::Ctr => "ctr",
            Objective::ConversionRate => "conversion_rate",
            Objective::Roas => "roas",
            Objective::Cpc => "cpc",
            Objective::Cpm => "cpm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Objective::CostPerResult => "CPA (cost per result)",
            Objective::Ctr => "CTR (click-through rate)",
            Objective::ConversionRate => "CVR (conversion rate)",
            Objective::Roas => "ROAS (return on ad spend)",
            Objective::Cpc => "CPC (cost per click)",
            Objective::Cpm => "CPM (cost per 1000 impressions)",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Objective::Ctr | Objective::ConversionRate | Objective::Roas => Direction::HigherBetter,
            Objective::CostPerResult | Objective::Cpc | Objective::Cpm => Direction::LowerBetter,
        }
    }

    pub fn test_family(self) -> TestFamily {
        match self {
            Objective::Ctr | Objective::ConversionRate => TestFamily::Proportion,
            Objective::CostPerResult | Objective::Cpc | Objective::Cpm | Objective::Roas => {
                TestFamily::Mean
            }
        }
    }
}

impl FromStr for Objective {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Supported confidence levels and their z thresholds
///
/// A comparison is significant when `|z| >= z_threshold()`. The table values
/// coincide with the two-sided critical values of the standard normal
/// (90% -> 1.645, 95% -> 1.960).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ConfidenceLevel {
    P65,
    P80,
    #[default]
    P90,
    P95,
    P99,
}

impl ConfidenceLevel {
    pub const ALL: [ConfidenceLevel; 5] = [
        ConfidenceLevel::P65,
        ConfidenceLevel::P80,
        ConfidenceLevel::P90,
        ConfidenceLevel::P95,
        ConfidenceLevel::P99,
    ];

    pub fn from_percent(percent: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.percent() == percent)
    }

    /// Resolve a requested level, falling back to 90% for unsupported values
    pub fn resolve(percent: u32) -> Self {
        Self::from_percent(percent).unwrap_or_else(|| {
            tracing::warn!(
                "Unsupported confidence level {}%, falling back to 90%",
                percent
            );
            ConfidenceLevel::P90
        })
    }

    pub fn percent(self) -> u32 {
        match self {
            ConfidenceLevel::P65 => 65,
            ConfidenceLevel::P80 => 80,
            ConfidenceLevel::P90 => 90,
            ConfidenceLevel::P95 => 95,
            ConfidenceLevel::P99 => 99,
        }
    }

    pub fn z_threshold(self) -> f64 {
        match self {
            ConfidenceLevel::P65 => 0.935,
            ConfidenceLevel::P80 => 1.282,
            ConfidenceLevel::P90 => 1.645,
            ConfidenceLevel::P95 => 1.960,
            ConfidenceLevel::P99 => 2.576,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConfidenceLevel::P65 => "Low: fastest verdicts, highest risk of a false winner",
            ConfidenceLevel::P80 => "Medium: balanced, suits most creative tests",
            ConfidenceLevel::P90 => "High: the ads platform's standard",
            ConfidenceLevel::P95 => "Very high: for large budget decisions",
            ConfidenceLevel::P99 => "Strict: research-grade confidence",
        }
    }
}

impl TryFrom<u32> for ConfidenceLevel {
    type Error = AnalysisError;

    fn try_from(percent: u32) -> Result<Self> {
        Self::from_percent(percent).ok_or_else(|| {
            AnalysisError::InvalidConfig(format!(
                "unsupported confidence level {}% (expected 65, 80, 90, 95 or 99)",
                percent
            ))
        })
    }
}

impl From<ConfidenceLevel> for u32 {
    fn from(level: ConfidenceLevel) -> Self {
        level.percent()
    }
}
