// Metric extraction from heterogeneous variant records
//
// Records arrive either as flat totals (spend, clicks, conversions, cpa, roas)
// or in the ads-insights shape with nested `actions`, `cost_per_action_type`
// and `purchase_roas` arrays. Numbers may be serialized as JSON strings.
//
// Extraction is total: absent, unparsable or negative inputs resolve to 0 and
// every derived ratio is finite.

use super::objective::Objective;
use serde::{Deserialize, Deserializer, Serialize};

/// Action types counted as conversions, in priority order
pub const CONVERSION_ACTION_TYPES: [&str; 3] = [
    "purchase",
    "offsite_conversion.fb_pixel_purchase",
    "lead",
];

/// A number that may have been serialized as a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    /// Non-negative float value, 0 when unparsable, negative or non-finite
    pub fn as_f64(&self) -> f64 {
        let value = match self {
            NumericValue::Number(n) => *n,
            NumericValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        finite_or_zero(value).max(0.0)
    }

    /// Truncated non-negative count
    pub fn as_count(&self) -> u64 {
        // float -> int casts saturate: negatives become 0
        self.as_f64().trunc() as u64
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Number(value)
    }
}

impl From<u64> for NumericValue {
    fn from(value: u64) -> Self {
        NumericValue::Number(value as f64)
    }
}

impl From<&str> for NumericValue {
    fn from(value: &str) -> Self {
        NumericValue::Text(value.to_string())
    }
}

/// One `{action_type, value}` entry of an insights breakdown
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionValue {
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub value: Option<NumericValue>,
}

impl ActionValue {
    pub fn new(action_type: &str, value: impl Into<NumericValue>) -> Self {
        Self {
            action_type: action_type.to_string(),
            value: Some(value.into()),
        }
    }
}

/// Raw per-variant performance record as supplied by the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantRecord {
    #[serde(default, alias = "variant_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, alias = "label", deserialize_with = "string_or_number")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<NumericValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpa: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roas: Option<NumericValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_action_type: Option<Vec<ActionValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_roas: Option<Vec<ActionValue>>,
}

impl VariantRecord {
    /// Flat-totals record, the shape produced by manual entry
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_totals(mut self, spend: f64, impressions: u64, clicks: u64) -> Self {
        self.spend = Some(spend.into());
        self.impressions = Some(impressions.into());
        self.clicks = Some(clicks.into());
        self
    }

    pub fn with_conversions(mut self, conversions: u64) -> Self {
        self.conversions = Some(conversions.into());
        self
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Null(()) => String::new(),
    })
}

/// Canonical metric bundle derived from one record
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalMetrics {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub reach: u64,
    pub conversions: u64,
    /// Click-through rate in percent
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub cpa: f64,
    pub roas: f64,
    /// Conversions per click in percent
    pub conversion_rate: f64,
}

impl CanonicalMetrics {
    /// Value of the metric an objective is judged on
    pub fn objective_value(&self, objective: Objective) -> f64 {
        match objective {
            Objective::CostPerResult => self.cpa,
            Objective::Ctr => self.ctr,
            Objective::ConversionRate => self.conversion_rate,
            Objective::Roas => self.roas,
            Objective::Cpc => self.cpc,
            Objective::Cpm => self.cpm,
        }
    }

    /// Sample size backing mean-based tests and the sufficiency floor
    ///
    /// Conversions when there are any, otherwise clicks.
    pub fn effective_sample(&self) -> u64 {
        if self.conversions > 0 {
            self.conversions
        } else {
            self.clicks
        }
    }
}

fn scalar(value: &Option<NumericValue>) -> f64 {
    value.as_ref().map_or(0.0, NumericValue::as_f64)
}

fn count(value: &Option<NumericValue>) -> u64 {
    value.as_ref().map_or(0, NumericValue::as_count)
}

/// First entry matching a conversion action type, by priority
fn find_conversion_entry(entries: &[ActionValue]) -> Option<&ActionValue> {
    CONVERSION_ACTION_TYPES
        .iter()
        .find_map(|wanted| entries.iter().find(|e| e.action_type == *wanted))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Quotient scaled by `scale`; 0 for a zero denominator or an overflow
fn ratio(numerator: f64, denominator: f64, scale: f64) -> f64 {
    if denominator > 0.0 {
        finite_or_zero(numerator / denominator * scale)
    } else {
        0.0
    }
}

/// Conversions: explicit field, then the `actions` breakdown, then 0
fn conversions_of(record: &VariantRecord) -> u64 {
    if let Some(value) = &record.conversions {
        return value.as_count();
    }
    record
        .actions
        .as_deref()
        .and_then(find_conversion_entry)
        .map_or(0, |entry| count(&entry.value))
}

/// CPA: explicit field, then `cost_per_action_type`, then spend / conversions
fn cpa_of(record: &VariantRecord, spend: f64, conversions: u64) -> f64 {
    if let Some(value) = &record.cpa {
        return value.as_f64();
    }
    if let Some(entry) = record
        .cost_per_action_type
        .as_deref()
        .and_then(find_conversion_entry)
    {
        return scalar(&entry.value);
    }
    ratio(spend, conversions as f64, 1.0)
}

/// ROAS: explicit field, then `purchase_roas[0]`, then revenue / spend
fn roas_of(record: &VariantRecord, spend: f64) -> f64 {
    if let Some(value) = &record.roas {
        return value.as_f64();
    }
    if let Some(first) = record.purchase_roas.as_deref().and_then(<[_]>::first) {
        return scalar(&first.value);
    }
    ratio(scalar(&record.revenue), spend, 1.0)
}

/// Normalize one variant record into canonical metrics
///
/// Never fails; an empty record yields an all-zero bundle.
pub fn extract_metrics(record: &VariantRecord) -> CanonicalMetrics {
    let spend = scalar(&record.spend);
    let impressions = count(&record.impressions);
    let clicks = count(&record.clicks);
    let reach = count(&record.reach);
    let conversions = conversions_of(record);

    let ctr = if impressions > 0 {
        ratio(clicks as f64, impressions as f64, 100.0)
    } else {
        scalar(&record.ctr)
    };
    let cpc = if clicks > 0 {
        ratio(spend, clicks as f64, 1.0)
    } else {
        scalar(&record.cpc)
    };
    let cpm = if impressions > 0 {
        ratio(spend, impressions as f64, 1000.0)
    } else {
        scalar(&record.cpm)
    };

    CanonicalMetrics {
        spend,
        impressions,
        clicks,
        reach,
        conversions,
        ctr,
        cpc,
        cpm,
        cpa: cpa_of(record, spend, conversions),
        roas: roas_of(record, spend),
        conversion_rate: ratio(conversions as f64, clicks as f64, 100.0),
    }
}
