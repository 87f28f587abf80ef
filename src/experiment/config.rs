// Tunable constants for experiment analysis
//
// Defaults reproduce the standard decision rules: 90% confidence, a floor of
// 50 conversions per variant, and a heuristic standard deviation of 30% of the
// mean for cost and return metrics.

use crate::error::AnalysisError;
use crate::experiment::objective::ConfidenceLevel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default heuristic standard deviation as a fraction of the mean
pub const DEFAULT_STD_DEV_RATIO: f64 = 0.3;

/// Default per-variant sample floor for acting on a result
pub const DEFAULT_MIN_CONVERSIONS: u64 = 50;

/// Configuration for experiment analysis
///
/// # Example
/// ```
/// use abverdict::experiment::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.confidence_level.percent(), 90);
/// assert_eq!(config.min_conversions, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Confidence level used when the caller does not request one
    pub confidence_level: ConfidenceLevel,

    /// Minimum conversions (clicks when a variant has none) every variant
    /// needs before a winner can be declared
    pub min_conversions: u64,

    /// Standard deviation assumed for mean-based tests, as a fraction of the
    /// mean
    ///
    /// Aggregate counters do not expose per-event variance, so this is a
    /// known simplification. Replace with a measured variance once several
    /// historical data points per variant are available.
    pub std_dev_ratio: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: ConfidenceLevel::P90,
            min_conversions: DEFAULT_MIN_CONVERSIONS,
            std_dev_ratio: DEFAULT_STD_DEV_RATIO,
        }
    }
}

impl AnalysisConfig {
    /// Stricter gate for large budget shifts
    pub fn strict() -> Self {
        Self {
            confidence_level: ConfidenceLevel::P95,
            min_conversions: 100,
            std_dev_ratio: DEFAULT_STD_DEV_RATIO,
        }
    }

    /// Looser gate for early creative exploration
    pub fn exploratory() -> Self {
        Self {
            confidence_level: ConfidenceLevel::P80,
            min_conversions: 30,
            std_dev_ratio: DEFAULT_STD_DEV_RATIO,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid analysis config in {}", path.display()))
    }

    /// Parse configuration from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.min_conversions == 0 {
            return Err(AnalysisError::InvalidConfig(
                "min_conversions must be >= 1".to_string(),
            ));
        }

        if !self.std_dev_ratio.is_finite() || self.std_dev_ratio <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "std_dev_ratio must be a positive number, got {}",
                self.std_dev_ratio
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.confidence_level, ConfidenceLevel::P90);
        assert_eq!(config.min_conversions, 50);
        assert_eq!(config.std_dev_ratio, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        let strict = AnalysisConfig::strict();
        assert_eq!(strict.confidence_level, ConfidenceLevel::P95);
        assert_eq!(strict.min_conversions, 100);
        assert!(strict.validate().is_ok());

        let exploratory = AnalysisConfig::exploratory();
        assert_eq!(exploratory.confidence_level, ConfidenceLevel::P80);
        assert_eq!(exploratory.min_conversions, 30);
        assert!(exploratory.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_min_conversions() {
        let mut config = AnalysisConfig::default();
        config.min_conversions = 0;
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_std_dev_ratio() {
        let mut config = AnalysisConfig::default();
        config.std_dev_ratio = -0.1;
        assert!(config.validate().is_err());

        config.std_dev_ratio = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str("confidence_level = 95").unwrap();
        assert_eq!(config.confidence_level, ConfidenceLevel::P95);
        assert_eq!(config.min_conversions, 50);
        assert_eq!(config.std_dev_ratio, 0.3);
    }

    #[test]
    fn test_full_toml() {
        let toml = r#"
            confidence_level = 80
            min_conversions = 25
            std_dev_ratio = 0.45
        "#;
        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.confidence_level, ConfidenceLevel::P80);
        assert_eq!(config.min_conversions, 25);
        assert_eq!(config.std_dev_ratio, 0.45);
    }

    #[test]
    fn test_toml_rejects_unsupported_confidence() {
        assert!(AnalysisConfig::from_toml_str("confidence_level = 70").is_err());
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        assert!(AnalysisConfig::from_toml_str("min_conversions = 0").is_err());
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "min_conversions = 75").unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.min_conversions, 75);
    }

    #[test]
    fn test_from_missing_file() {
        assert!(AnalysisConfig::from_file("/nonexistent/abverdict.toml").is_err());
    }
}
