//! Sentinel-2 burned area with NDVI/NDWI threshold

use anyhow::{Context, Result};
use burned_area::core::classifier::{DEFAULT_NDVI_THRESHOLD, DEFAULT_NDWI_THRESHOLD};
use burned_area::{BurnRule, BurnedAreaWorkflow, ClassifierConfig, WorkflowConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuleArg {
    /// (dNDWI2 > t && dNDVI > t && pre SCL = 4) || post SCL = 4
    Reference,
    /// dNDWI2 > t && dNDVI > t && (pre SCL = 4 || post SCL = 4)
    Corrected,
}

impl From<RuleArg> for BurnRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Reference => BurnRule::ReferenceCompatible,
            RuleArg::Corrected => BurnRule::Corrected,
        }
    }
}

#[derive(Parser)]
#[command(name = "burned-area")]
#[command(author, version, about = "Sentinel-2 burned area with NDVI/NDWI threshold", long_about = None)]
struct Cli {
    /// Sentinel-2 Level-2A pre-event acquisition (directory holding catalog.json)
    #[arg(long = "pre_event", alias = "pre-event")]
    pre_event: PathBuf,

    /// Sentinel-2 Level-2A post-event acquisition (directory holding catalog.json)
    #[arg(long = "post_event", alias = "post-event")]
    post_event: PathBuf,

    /// NDVI difference threshold
    #[arg(long = "ndvi_threshold", alias = "ndvi-threshold", default_value_t = DEFAULT_NDVI_THRESHOLD)]
    ndvi_threshold: f64,

    /// NDWI difference threshold
    #[arg(long = "ndwi_threshold", alias = "ndwi-threshold", default_value_t = DEFAULT_NDWI_THRESHOLD)]
    ndwi_threshold: f64,

    /// Directory receiving catalog.json and the product
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// How the index test and the scene classification test combine
    #[arg(long, value_enum, default_value = "reference")]
    rule: RuleArg,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    let config = WorkflowConfig {
        pre_event: cli.pre_event,
        post_event: cli.post_event,
        output_dir: cli.output_dir,
        classifier: ClassifierConfig::new(cli.ndvi_threshold, cli.ndwi_threshold)
            .with_rule(cli.rule.into()),
    };

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Cannot create output directory {}", config.output_dir.display())
    })?;

    let start = Instant::now();
    let output = BurnedAreaWorkflow::new(config)
        .run()
        .context("Burned area processing failed")?;

    log::info!(
        "Done in {:.1?}: {} ({} burned, {} unburned, {} unreliable)",
        start.elapsed(),
        output.catalog_path.display(),
        output.stats.burned,
        output.stats.unburned,
        output.stats.unreliable
    );

    Ok(())
}
