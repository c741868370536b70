use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use inquire::CustomType;

use tempcast_core::{
    Config, HarmonicRegression, Location, NasaPowerProvider, PipelineConfig, pipeline,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tempcast", version, about = "Hourly temperature forecasting CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default forecast location interactively.
    Configure,

    /// Run the forecasting pipeline for one location and target day.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Latitude of the forecast point; falls back to the configured default.
    #[arg(long)]
    pub latitude: Option<f64>,

    /// Longitude of the forecast point; falls back to the configured default.
    #[arg(long)]
    pub longitude: Option<f64>,

    /// First day of history to fetch (inclusive).
    #[arg(long, default_value = "2004-01-01")]
    pub history_start: NaiveDate,

    /// Last day of history to fetch (inclusive).
    #[arg(long, default_value = "2024-12-31")]
    pub history_end: NaiveDate,

    /// Training data ends (exclusive) at this day.
    #[arg(long, default_value = "2023-01-01")]
    pub train_cutoff: NaiveDate,

    /// Evaluation data ends (exclusive) at this day.
    #[arg(long, default_value = "2024-01-01")]
    pub test_cutoff: NaiveDate,

    /// Length of the forward forecast in hours from the end of training data.
    #[arg(long, default_value_t = 2 * 365 * 24)]
    pub horizon_hours: usize,

    /// Future day to extract from the forward forecast.
    #[arg(long, default_value = "2024-12-01")]
    pub target_day: NaiveDate,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Run(args) => run_pipeline(args).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_help_message("Decimal degrees, e.g. 21.03")
        .prompt()
        .context("Failed to read latitude")?;
    let longitude = CustomType::<f64>::new("Longitude:")
        .with_help_message("Decimal degrees, e.g. 105.85")
        .prompt()
        .context("Failed to read longitude")?;

    config.set_default_location(Location { latitude, longitude });
    config.save()?;

    println!("Saved default location ({latitude}, {longitude}).");
    Ok(())
}

async fn run_pipeline(args: RunArgs) -> anyhow::Result<()> {
    let config = Config::load()?;

    let location = match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => Location { latitude, longitude },
        (None, None) => config.default_location().ok_or_else(|| {
            anyhow!(
                "No location given and no default configured.\n\
                 Hint: pass --latitude/--longitude or run `tempcast configure` first."
            )
        })?,
        _ => {
            return Err(anyhow!("--latitude and --longitude must be given together."));
        }
    };

    let pipeline_config = PipelineConfig {
        latitude: location.latitude,
        longitude: location.longitude,
        history_start: args.history_start,
        history_end: args.history_end,
        train_cutoff: args.train_cutoff,
        test_cutoff: args.test_cutoff,
        future_horizon_hours: args.horizon_hours,
        target_day: args.target_day,
    };

    let provider = NasaPowerProvider::new()?;
    let model = HarmonicRegression::default();

    let report = pipeline::run(&pipeline_config, &provider, &model).await?;
    render::print_report(&pipeline_config, &report);

    Ok(())
}
