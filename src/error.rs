//! Error taxonomy for the significance engine
//!
//! The engine itself is total over its numeric domain: zero impressions,
//! zero clicks or zero variance resolve to neutral values. Only caller
//! programming errors surface here.

use thiserror::Error;

/// Errors raised by experiment analysis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Fewer than two variants, an unknown objective key, or malformed manual input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Analysis configuration out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
