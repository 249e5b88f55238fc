//! Warbond CLI: fetch, value and chart Ukrainian war bonds.
//!
//! With no flags: pull the latest NBU fair-value table and the MoF coupon
//! rates, print one summary per bond, project 1000 over 2 years and show the
//! chart in the terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warbond_core::data::{CouponRateProvider, FairValueProvider};
use warbond_core::{run_pipeline, Bond, InvalidRecordPolicy, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "warbond",
    about = "Value Ukrainian war bonds and chart their compound growth"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Projection horizon in years (overrides the config file).
    #[arg(long)]
    years: Option<usize>,

    /// Principal to project (overrides the config file).
    #[arg(long)]
    principal: Option<f64>,

    /// Skip the terminal chart.
    #[arg(long, default_value_t = false)]
    no_chart: bool,

    /// Print bond metrics and projection as JSON instead of text summaries.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log and drop records that cannot be valued instead of aborting.
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,

    /// Log filter, e.g. `info` or `warbond_core=debug`.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = load_config(&cli)?;
    let today = chrono::Local::now().date_naive();
    let policy = if cli.skip_invalid {
        InvalidRecordPolicy::Skip
    } else {
        InvalidRecordPolicy::Abort
    };

    let price_provider = FairValueProvider::from_config(&config.sources)?;
    let coupon_provider = CouponRateProvider::from_config(&config.sources)?;
    let output = run_pipeline(&price_provider, &coupon_provider, &config, policy, today)?;

    let series = output
        .projection(config.projection.principal, config.projection.years)
        .context("projecting bond growth")?;

    if cli.json {
        let metrics: Vec<_> = output.bonds.iter().map(Bond::metrics).collect();
        let doc = serde_json::json!({
            "today": output.today,
            "bonds": metrics,
            "projection": series,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_summaries(&output.bonds);
    }

    if !output.skipped.is_empty() {
        eprintln!("Skipped {} invalid record(s)", output.skipped.len());
    }

    if !cli.no_chart {
        info!(series = series.len(), "opening chart");
        warbond_tui::show(&series)?;
    }

    Ok(())
}

fn init_logging(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .with_context(|| format!("invalid --log-level `{filter}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(years) = cli.years {
        config.projection.years = years;
    }
    if let Some(principal) = cli.principal {
        config.projection.principal = principal;
    }
    config.validate()?;
    Ok(config)
}

fn print_summaries(bonds: &[Bond]) {
    if bonds.is_empty() {
        println!("No bonds found");
        return;
    }
    for bond in bonds {
        println!("{}", bond.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["warbond"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.no_chart);
        assert!(!cli.json);
        assert!(!cli.skip_invalid);
        assert_eq!(cli.log_level, "warn");

        let config = load_config(&cli).unwrap();
        assert_eq!(config.projection.years, 2);
        assert_eq!(config.projection.principal, 1000.0);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "warbond",
            "--years",
            "5",
            "--principal",
            "2500",
            "--no-chart",
            "--skip-invalid",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.projection.years, 5);
        assert_eq!(config.projection.principal, 2500.0);
        assert!(cli.no_chart);
        assert!(cli.skip_invalid);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["warbond", "--config", "/nonexistent/warbond.toml"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
