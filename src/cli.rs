use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use nse_ticker::{
    Config, HistoryOptions, LiveOptions, NewsOptions, ResponseEnvelope, Ticker,
};

#[derive(Parser)]
#[command(name = "nse-ticker")]
#[command(about = "Fetch NSE candles, company info, corporate events and news")]
#[command(version)]
pub struct Cli {
    /// NSE symbol, e.g. RELIANCE or TCS
    pub symbol: String,

    #[command(subcommand)]
    pub command: Commands,

    /// Include debug traces in the printed envelopes
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// JSON config file; defaults to NSE_TICKER_CONFIG or builtin settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how the symbol resolves, with suggestions on a miss
    Resolve,

    /// Historical candles for a lookback or an explicit range
    History {
        /// Candle interval in minutes
        #[arg(short, long, default_value_t = 1440)]
        interval: u32,

        /// Days back from now; 0 means since midnight today
        #[arg(short, long, conflicts_with_all = ["start", "end"])]
        lookback: Option<i64>,

        /// Range start, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD"
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Range end, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (whole day)
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Write candles to this CSV file instead of printing them
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Today's candles since the session opened
    Live {
        #[arg(short, long, default_value_t = 5)]
        interval: u32,

        /// Fetch even when today is not a trading day
        #[arg(long)]
        skip_trading_day_check: bool,
    },

    /// Print a company summary
    Info,

    /// Corporate actions grouped by category
    Events,

    /// Paginated company news
    News {
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        #[arg(short, long, default_value_t = 5)]
        size: u32,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::from_env().context("Failed to load configuration")?,
    };
    let tz = config.timezone;

    let ticker = Ticker::builder(&cli.symbol)
        .config(config)
        .debug(cli.debug)
        .build()
        .context("Failed to set up the market data client")?;
    let debug = cli.debug;

    match cli.command {
        Commands::Resolve => {
            let report = json!({
                "symbol": ticker.symbol(),
                "resolved": ticker.resolved(),
                "suggestions": ticker.suggestions(),
                "debug_info": ticker.resolution_trace(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::History {
            interval,
            lookback,
            start,
            end,
            csv,
        } => {
            let options = HistoryOptions {
                interval,
                lookback,
                start,
                end,
                debug,
            };
            let envelope = ticker.history(options);
            match (csv, envelope.data()) {
                (Some(path), Some(series)) => {
                    series
                        .save_csv(&path, tz)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} candles to {}", series.len(), path.display());
                }
                _ => print_envelope(&envelope)?,
            }
        }
        Commands::Live {
            interval,
            skip_trading_day_check,
        } => {
            let options = LiveOptions::new(interval)
                .with_trading_day_check(!skip_trading_day_check)
                .with_debug(debug);
            print_envelope(&ticker.live(options))?;
        }
        Commands::Info => ticker.info(debug),
        Commands::Events => print_envelope(&ticker.events(debug))?,
        Commands::News { page, size } => {
            let options = NewsOptions::new().page(page).size(size).with_debug(debug);
            print_envelope(&ticker.news(options))?;
        }
    }

    Ok(())
}

fn print_envelope<T: Serialize>(envelope: &ResponseEnvelope<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    if !envelope.is_success() {
        log::warn!("request finished with {} error(s)", envelope.error.len());
    }
    Ok(())
}
