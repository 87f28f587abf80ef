use abverdict::cli::{Cli, OutputFormat};
use abverdict::experiment::{
    analyze, analyze_manual, generate_demo_variants, AnalysisConfig, AnalysisResult,
    ConfidenceLevel, ManualVariant, Objective, VariantRecord,
};
use abverdict::json_output::JsonAnalysisReport;
use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Read input from a file, or stdin for "-"
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read variants from stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path),
        None => Ok(AnalysisConfig::default()),
    }
}

fn run_analysis(args: &Cli, config: &AnalysisConfig) -> Result<AnalysisResult> {
    let objective = Objective::from_key(&args.objective)?;
    let confidence = args
        .confidence
        .map_or(config.confidence_level, ConfidenceLevel::resolve);

    match (&args.input, args.demo) {
        (Some(path), None) => {
            let content = read_input(path)?;
            if args.manual {
                let variants: Vec<ManualVariant> = serde_json::from_str(&content)
                    .with_context(|| format!("Invalid manual variants in {}", path.display()))?;
                Ok(analyze_manual(&variants, objective, confidence, config)?)
            } else {
                let variants: Vec<VariantRecord> = serde_json::from_str(&content)
                    .with_context(|| format!("Invalid variant records in {}", path.display()))?;
                Ok(analyze(&variants, objective, confidence, config)?)
            }
        }
        (None, Some(count)) => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let variants = generate_demo_variants(count, &mut rng);
            Ok(analyze(&variants, objective, confidence, config)?)
        }
        (Some(_), Some(_)) => {
            anyhow::bail!("Cannot specify both --input and --demo. Choose one.");
        }
        (None, None) => {
            anyhow::bail!(
                "Must specify either --input FILE or --demo COUNT. Usage: abverdict -i variants.json -o ctr"
            );
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(args.config.as_deref())?;
    let result = run_analysis(&args, &config)?;

    match args.format {
        OutputFormat::Text => print!("{}", result.to_report_string()),
        OutputFormat::Json => {
            let report = JsonAnalysisReport::from_result(&result);
            println!("{}", report.to_json_pretty()?);
        }
    }

    Ok(())
}
