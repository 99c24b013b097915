use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use demand_forecast::adjustment::{ExternalFactors, PromotionType};
use demand_forecast::data::parse_date;
use demand_forecast::export::{forecast_json, write_forecast_csv};
use demand_forecast::summary::DatasetSummary;
use demand_forecast::trend::correlation;
use demand_forecast::{
    Column, DataLoader, ForecastConfig, ForecastEngine, ForecastRequest, ForecastSession,
    TargetColumn,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Demand forecasting from historical sales spreadsheets
#[derive(Parser, Debug)]
#[command(name = "flavour-forecast", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show shape, missing values and column statistics
    Summary {
        /// CSV or Excel (.xlsx) file with the demand dataset
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Forecast a target column and apply external-factor adjustments
    Forecast {
        /// CSV or Excel (.xlsx) file with the demand dataset
        #[arg(short, long)]
        input: PathBuf,
        /// Column to forecast: "Sales Volume" or "Demand Volume"
        #[arg(short, long, default_value = "Sales Volume")]
        target: TargetColumn,
        /// Number of days to forecast (1-365)
        #[arg(short, long, default_value_t = 30)]
        days: usize,
        /// Holidays expected over the horizon
        #[arg(long, default_value_t = 0)]
        holidays: u32,
        /// Concerts or festivals expected over the horizon
        #[arg(long, default_value_t = 0)]
        concerts: u32,
        /// Promotion type: none, discount, bogo or other
        #[arg(long, default_value = "none")]
        promotion: PromotionType,
        /// Discount percentage (0-100)
        #[arg(long, default_value_t = 0)]
        discount: u32,
        /// Fill missing values with column means before forecasting
        #[arg(long)]
        fill_missing: bool,
        /// JSON configuration overriding the model defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write date,baseline,adjusted rows to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the full run as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Pearson correlation between two columns
    Correlate {
        /// CSV or Excel (.xlsx) file with the demand dataset
        #[arg(short, long)]
        input: PathBuf,
        /// First column
        #[arg(short)]
        x: Column,
        /// Second column
        #[arg(short)]
        y: Column,
        /// First date to include
        #[arg(long, value_parser = parse_cli_date)]
        from: Option<NaiveDate>,
        /// Last date to include
        #[arg(long, value_parser = parse_cli_date)]
        to: Option<NaiveDate>,
    },
}

fn parse_cli_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("cannot parse date '{}'", raw))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Summary { input } => {
            let dataset = DataLoader::from_path(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            print!("{}", DatasetSummary::of(&dataset));
        }
        Command::Forecast {
            input,
            target,
            days,
            holidays,
            concerts,
            promotion,
            discount,
            fill_missing,
            config,
            output,
            json,
        } => {
            let config = match config {
                Some(path) => ForecastConfig::from_json_file(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?,
                None => ForecastConfig::default(),
            };
            let engine = ForecastEngine::new(config)?;

            let mut dataset = DataLoader::from_path(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            if fill_missing {
                dataset = dataset.fill_missing();
            }

            let factors = ExternalFactors {
                holidays,
                concerts,
                promotion,
                discount_percent: discount,
            };
            let mut session = ForecastSession::new(engine);
            session.load_dataset(dataset);
            let run = session
                .run_forecast(ForecastRequest::new(target, days).with_factors(factors))
                .context("Forecast failed")?
                .clone();

            if let Some(path) = output {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_forecast_csv(&run, BufWriter::new(file))?;
                log::info!("Wrote {} forecast rows to {}", days, path.display());
            }

            let metrics = match session.evaluate() {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    log::warn!("Accuracy not available: {}", e);
                    None
                }
            };

            if json {
                println!("{}", forecast_json(&run)?);
                if let Some(metrics) = metrics {
                    serde_json::to_writer_pretty(io::stdout(), &metrics)?;
                    println!();
                }
                return Ok(());
            }

            println!("{} forecast for the next {} days ({})", target, days, run.model);
            println!("{:<12} {:>12} {:>12}", "Date", "Baseline", "Adjusted");
            for ((date, baseline), adjusted) in run
                .forecast_dates
                .iter()
                .zip(&run.baseline)
                .zip(&run.adjusted.values)
            {
                println!("{:<12} {:>12.2} {:>12.2}", date, baseline, adjusted);
            }
            println!();
            for line in &run.adjusted.breakdown {
                println!("- {}", line);
            }
            println!(
                "The overall adjustment applied to the forecast is an increase of {:.1}%.",
                run.adjusted.total_percentage * 100.0
            );
            if let Some(metrics) = metrics {
                println!();
                print!("{}", metrics);
            }
        }
        Command::Correlate {
            input,
            x,
            y,
            from,
            to,
        } => {
            let dataset = DataLoader::from_path(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?
                .filter_dates(from, to)?;
            let r = correlation(&dataset, x, y)?;
            println!("Correlation between {} and {}: {:.4}", x, y, r);
        }
    }

    Ok(())
}
