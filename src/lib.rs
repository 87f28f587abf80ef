//! abverdict - statistical significance verdicts for advertising A/B experiments
//!
//! Given per-variant performance counters (spend, impressions, clicks,
//! conversions, revenue), this library decides whether one variant
//! statistically outperforms the others on a chosen objective and recommends
//! scaling the winner, continuing the test, or stopping.

pub mod cli;
pub mod error;
pub mod experiment;
pub mod json_output;

pub use error::{AnalysisError, Result};
