use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use demand_synth::general::electricity_demand::load_targets;
use demand_synth::general::export::{write_pivot_csv, write_series_csv};
use demand_synth::synth::pipeline::synthesize;
use demand_synth::synth::plot::plot_overview;
use demand_synth::synth::report::{format_monthly_summary, format_validation_table, monthly_summary};
use demand_synth::synth::synth_utils::SynthesisConfig;
use load_model::PatternPreset;
use tracing::info;

#[derive(Parser)]
#[command(name = "demand-synth")]
#[command(about = "Generate an hourly load curve from monthly peak and total demand", long_about = None)]
struct Cli {
    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Calendar year to generate
    #[arg(short, long)]
    year: Option<i32>,

    /// Built-in load shape (office, factory-weekdays, supermarket, ...)
    #[arg(short, long)]
    preset: Option<PatternPreset>,

    /// Non-working day amplitude in percent of the working-day peak (0-120)
    #[arg(short, long)]
    amplitude: Option<f64>,

    /// Monthly targets as CSV or Excel (month, peak kW, total kWh)
    #[arg(short, long)]
    targets: Option<PathBuf>,

    /// Output CSV with one row per hour
    #[arg(short, long, default_value = "demand.csv")]
    out: PathBuf,

    /// Optional CSV with one row per date and one column per hour
    #[arg(long)]
    pivot: Option<PathBuf>,

    /// Optional PNG overview chart
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Generate months in parallel
    #[arg(long)]
    parallel: bool,
}

fn build_config(cli: &Cli) -> Result<SynthesisConfig> {
    let mut config = match &cli.config {
        Some(path) => SynthesisConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SynthesisConfig::default(),
    };

    if let Some(year) = cli.year {
        config.year = year;
    }
    if let Some(preset) = cli.preset {
        config.preset = preset;
        config.pattern = None;
    }
    if let Some(amplitude) = cli.amplitude {
        config.amplitude_percent = Some(amplitude);
    }
    if let Some(path) = &cli.targets {
        config.targets = load_targets(path)
            .with_context(|| format!("Failed to load targets: {}", path.display()))?;
    }
    config.parallel |= cli.parallel;

    Ok(config)
}

fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let input = config.to_input().context("Invalid configuration")?;

    info!(
        year = input.year,
        preset = %config.preset.name(),
        amplitude_percent = input.pattern.amplitude_percent(),
        months = input.targets.len(),
        "Generating demand"
    );

    let output = synthesize(&input)?;

    write_series_csv(&output.records, &cli.out)?;
    info!(file = %cli.out.display(), records = output.records.len(), "Series written");

    if let Some(path) = &cli.pivot {
        write_pivot_csv(&output.records, path)?;
        info!(file = %path.display(), "Pivot written");
    }

    if let Some(path) = &cli.plot {
        plot_overview(&output.records, &output.validation, &path.to_string_lossy())
            .map_err(|e| anyhow::anyhow!("Failed to draw {}: {}", path.display(), e))?;
    }

    println!("{}", format_monthly_summary(&monthly_summary(&output.records)));
    println!("{}", format_validation_table(&output.validation));

    if !output.skipped_months.is_empty() {
        println!("Skipped months (no target): {:?}", output.skipped_months);
    }

    Ok(())
}
