//! Leadlag CLI: ingestion, lead-lag analytics and payload commands.
//!
//! Commands:
//! - `ingest macro`: fetch configured macro indicators (FRED)
//! - `ingest benchmark`: fetch configured benchmark bars (Yahoo Finance)
//! - `ingest files`: load bar CSV files from the configured directory
//! - `heatmap` / `ic` / `report`: lead-lag analytics as JSON
//! - `payload prices` / `payload macro`: chart payloads as JSON
//! - `series list`: registered series with row counts

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use leadlag_core::data::{CircuitBreaker, FredProvider, IngestSummary, LogProgress, YahooProvider};
use leadlag_core::store::{count_observations, count_price_bars, list_series, Store};
use leadlag_runner::{
    heatmap_from_store, ic_from_store, macro_payload, price_payload, run_benchmark_ingest,
    run_file_ingest, run_macro_ingest, run_report, IngestConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "leadlag",
    about = "Leadlag CLI: idempotent time-series store and lead-lag analytics"
)]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, default_value = "leadlag.db")]
    db: PathBuf,

    /// TOML config file. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest data into the store.
    Ingest {
        #[command(subcommand)]
        target: IngestTarget,
    },
    /// Indicator × lag correlation heatmap against benchmark returns.
    Heatmap {
        #[command(flatten)]
        output: AnalyticsArgs,
    },
    /// Information coefficient per indicator and lag.
    Ic {
        #[command(flatten)]
        output: AnalyticsArgs,
    },
    /// Heatmap and IC together, with the dataset fingerprint.
    Report {
        #[command(flatten)]
        output: AnalyticsArgs,
    },
    /// Chart payloads.
    Payload {
        #[command(subcommand)]
        kind: PayloadKind,
    },
    /// Series registry commands.
    Series {
        #[command(subcommand)]
        action: SeriesAction,
    },
}

#[derive(Subcommand)]
enum IngestTarget {
    /// Macro indicators from FRED. Uses FRED_API_KEY when set.
    Macro,
    /// Benchmark bars from Yahoo Finance.
    Benchmark {
        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,
    },
    /// Bar CSV files from the configured directory.
    Files {
        /// Overrides the configured directory.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PayloadKind {
    /// OHLC series for equity, fx and metal instruments.
    Prices {
        #[command(flatten)]
        output: AnalyticsArgs,
    },
    /// Raw and z-scored macro series.
    Macro {
        #[command(flatten)]
        output: AnalyticsArgs,
    },
}

#[derive(Subcommand)]
enum SeriesAction {
    /// List every registered series.
    List,
}

#[derive(clap::Args)]
struct AnalyticsArgs {
    /// Only use data at or after this date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Pretty-print JSON.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest { target } => run_ingest(&cli.db, config, target),
        Commands::Heatmap { output } => {
            let store = open_store(&cli.db)?;
            let heatmap = heatmap_from_store(
                store.conn(),
                &config.analytics.to_config()?,
                &config.analytics.benchmark_codes,
                parse_start(output.start.as_deref())?,
            )?;
            print_json(&heatmap, output.pretty)
        }
        Commands::Ic { output } => {
            let store = open_store(&cli.db)?;
            let ic = ic_from_store(
                store.conn(),
                &config.analytics.to_config()?,
                &config.analytics.benchmark_codes,
                parse_start(output.start.as_deref())?,
            )?;
            print_json(&ic, output.pretty)
        }
        Commands::Report { output } => {
            let store = open_store(&cli.db)?;
            let report = run_report(
                store.conn(),
                &config.analytics.to_config()?,
                &config.analytics.benchmark_codes,
                parse_start(output.start.as_deref())?,
            )?;
            print_json(&report, output.pretty)
        }
        Commands::Payload { kind } => {
            let store = open_store(&cli.db)?;
            match kind {
                PayloadKind::Prices { output } => {
                    let payload = price_payload(store.conn(), parse_start(output.start.as_deref())?)?;
                    print_json(&payload, output.pretty)
                }
                PayloadKind::Macro { output } => {
                    let payload = macro_payload(store.conn(), parse_start(output.start.as_deref())?)?;
                    print_json(&payload, output.pretty)
                }
            }
        }
        Commands::Series { action } => match action {
            SeriesAction::List => run_series_list(&cli.db),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<IngestConfig> {
    match path {
        Some(path) => IngestConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(IngestConfig::default()),
    }
}

fn open_store(path: &Path) -> Result<Store> {
    Store::open(path).with_context(|| format!("opening store {}", path.display()))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn parse_start(start: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    start
        .map(|s| -> Result<DateTime<Utc>> {
            Ok(parse_date(s)?.and_time(chrono::NaiveTime::MIN).and_utc())
        })
        .transpose()
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn run_ingest(db: &Path, mut config: IngestConfig, target: IngestTarget) -> Result<()> {
    let mut store = open_store(db)?;
    let progress = LogProgress;
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());

    let summary = match target {
        IngestTarget::Macro => {
            let provider = FredProvider::from_env(circuit_breaker)?;
            if !provider.uses_api_key() {
                tracing::info!("FRED_API_KEY not set; using the public CSV endpoint");
            }
            run_macro_ingest(&mut store, &config, &provider, &progress)?
        }
        IngestTarget::Benchmark { end } => {
            let end = match end {
                Some(s) => parse_date(&s)?,
                None => Utc::now().date_naive(),
            };
            let provider = YahooProvider::new(circuit_breaker)?;
            run_benchmark_ingest(&mut store, &config, &provider, end, &progress)?
        }
        IngestTarget::Files { dir } => {
            if let Some(dir) = dir {
                config.files.dir = dir;
            }
            run_file_ingest(&mut store, &config, &progress)?
        }
    };

    print_ingest_summary(&summary);
    Ok(())
}

fn print_ingest_summary(summary: &IngestSummary) {
    println!(
        "Series: {} total, {} ingested, {} warnings; {} rows written",
        summary.total, summary.succeeded, summary.warned, summary.rows_written
    );
    for (code, err) in &summary.warnings {
        eprintln!("Warning for {code}: {err}");
    }
}

fn run_series_list(db: &Path) -> Result<()> {
    let store = open_store(db)?;
    let series = list_series(store.conn())?;
    if series.is_empty() {
        println!("No series registered in {}", db.display());
        return Ok(());
    }

    println!(
        "{:<8} {:<12} {:<8} {:<5} {:>8} {:>8}",
        "Source", "Code", "Class", "Freq", "Obs", "Bars"
    );
    println!("{}", "-".repeat(54));
    for info in &series {
        let obs = count_observations(store.conn(), info.series_id)?;
        let bars = count_price_bars(store.conn(), info.series_id)?;
        println!(
            "{:<8} {:<12} {:<8} {:<5} {:>8} {:>8}",
            info.source,
            info.code,
            info.asset_class.as_str(),
            info.freq,
            obs,
            bars
        );
    }
    Ok(())
}
