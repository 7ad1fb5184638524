//! stock-dash - command-line front end for price charts and forecasts.
//!
//! Every subcommand prints a figure as JSON on stdout, ready for a chart
//! renderer. Logs go to stderr and are controlled with `RUST_LOG`.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use price_forecast::chart::{ema_figure, price_figure};
use price_forecast::providers::{CsvDirectoryProvider, SimulatedProvider};
use price_forecast::{ForecastConfig, Forecaster, HistoryWindow, MarketDataProvider};

#[derive(Debug, Parser)]
#[command(name = "stock-dash", version, about = "Stock price charts and short-horizon forecasts")]
struct Cli {
    /// Where price history comes from
    #[arg(long, value_enum, default_value_t = Source::Simulated, global = true)]
    source: Source,

    /// Directory of <TICKER>.csv files for `--source csv`
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// TOML file overriding the forecast configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Simulated,
    Csv,
    Yahoo,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Forecast closing prices for the next N days
    Forecast(ForecastArgs),
    /// Daily open and close prices
    Prices(PricesArgs),
    /// Exponential moving average of the close
    Indicators(IndicatorArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Args)]
struct ForecastArgs {
    #[arg(long)]
    ticker: String,

    /// Number of forecast points to produce
    #[arg(long)]
    days: i64,
}

#[derive(Debug, Args)]
struct PricesArgs {
    #[arg(long)]
    ticker: String,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Day after the last one to include (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,
}

#[derive(Debug, Args)]
struct IndicatorArgs {
    #[arg(long)]
    ticker: String,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Day after the last one to include (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    #[arg(long, default_value_t = 20)]
    span: usize,
}

fn build_provider(cli: &Cli) -> Result<Box<dyn MarketDataProvider>> {
    let provider: Box<dyn MarketDataProvider> = match cli.source {
        Source::Simulated => Box::new(SimulatedProvider::new(Local::now().date_naive())),
        Source::Csv => Box::new(CsvDirectoryProvider::new(&cli.data_dir)),
        #[cfg(feature = "fetch")]
        Source::Yahoo => Box::new(price_forecast::providers::YahooProvider::new()?),
        #[cfg(not(feature = "fetch"))]
        Source::Yahoo => bail!("the yahoo source needs a build with `--features fetch`"),
    };
    Ok(provider)
}

fn load_config(path: Option<&PathBuf>) -> Result<ForecastConfig> {
    match path {
        Some(path) => ForecastConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(ForecastConfig::default()),
    }
}

fn fetch_nonempty(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    window: &HistoryWindow,
) -> Result<price_forecast::PriceSeries> {
    let series = provider.fetch_daily_history(ticker, window)?;
    if series.is_empty() {
        bail!("no price data available for ticker '{ticker}'");
    }
    Ok(series)
}

const DEFAULT_LOG_FILTER: &str = "price_forecast=info";

/// `RUST_LOG` directives when set and valid, otherwise the crate at info
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Explicit `--start/--end` range, or the configured history
fn history_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    configured: HistoryWindow,
) -> Result<HistoryWindow> {
    Ok(match (start, end) {
        (Some(start), Some(end)) => HistoryWindow::range(start, end)?,
        _ => configured,
    })
}

/// The forecaster counts today as the first requested day.
fn requested_horizon(days: i64) -> Result<i64> {
    if days < 0 {
        bail!("--days must not be negative, got {days}");
    }
    days.checked_add(1)
        .with_context(|| format!("--days {days} is too large"))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let json = match &cli.command {
        Commands::Forecast(args) => {
            let horizon = requested_horizon(args.days)?;
            let forecaster = Forecaster::new(build_provider(&cli)?).with_config(config)?;
            let bundle = forecaster.forecast(&args.ticker, horizon)?;
            info!(
                ticker = bundle.ticker(),
                params = %bundle.best_params(),
                cv_score = bundle.cv_score(),
                "forecast complete"
            );
            bundle.to_figure().to_json()?
        }
        Commands::Prices(args) => {
            let window = history_window(args.start, args.end, config.history)?;
            let provider = build_provider(&cli)?;
            let series = fetch_nonempty(provider.as_ref(), &args.ticker, &window)?;
            price_figure(&series).to_json()?
        }
        Commands::Indicators(args) => {
            let window = history_window(args.start, args.end, config.history)?;
            let provider = build_provider(&cli)?;
            let series = fetch_nonempty(provider.as_ref(), &args.ticker, &window)?;
            ema_figure(&series, args.span)?.to_json()?
        }
        Commands::Config => config.to_toml()?,
    };

    println!("{json}");
    Ok(())
}
