//! CLI argument parsing for abverdict

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report (default)
    Text,
    /// JSON for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "abverdict")]
#[command(version)]
#[command(
    about = "Statistical significance verdicts for advertising A/B experiments",
    long_about = None
)]
pub struct Cli {
    /// JSON file with an array of variant records ("-" reads stdin)
    #[arg(short = 'i', long = "input", value_name = "FILE", conflicts_with = "demo")]
    pub input: Option<PathBuf>,

    /// Treat input as manually entered totals (name, spend, impressions, clicks, conversions, revenue)
    #[arg(long = "manual", requires = "input")]
    pub manual: bool,

    /// Analyze COUNT generated demo variants instead of an input file
    #[arg(long = "demo", value_name = "COUNT")]
    pub demo: Option<usize>,

    /// Seed for --demo, for reproducible output
    #[arg(long = "seed", value_name = "SEED", requires = "demo")]
    pub seed: Option<u64>,

    /// Objective deciding the winner: cost_per_result, ctr, conversion_rate, roas, cpc, cpm
    #[arg(
        short = 'o',
        long = "objective",
        value_name = "KEY",
        default_value = "cost_per_result"
    )]
    pub objective: String,

    /// Confidence level in percent: 65, 80, 90, 95 or 99 (default from config, 90)
    #[arg(long = "confidence", value_name = "PCT")]
    pub confidence: Option<u32>,

    /// TOML analysis configuration
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
