use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use assetbook_core::advisor::{generate_briefing, BriefingInput, TemplateBriefingGenerator};
use assetbook_core::dashboard::{build_dashboard, read_dashboard_holdings, write_dashboard};
use assetbook_core::portfolio::{value_portfolio, PortfolioConfig};
use assetbook_core::quotes::{
    fetch_prices, PriceProvider, StaticPriceProvider, YahooPriceProvider,
};
use assetbook_core::sync::SyncMetadata;
use assetbook_core::workbook::Workbook;
use assetbook_core::{WorkbookSyncService, WorkbookSyncServiceTrait};

use crate::config::{Config, LogFormat, PriceSource};

#[derive(Debug, Parser)]
#[command(name = "assetbook", about = "Synchronize the asset workbook and its dashboard.")]
pub struct Cli {
    /// Workbook to operate on. Overrides AB_WORKBOOK_PATH.
    #[arg(long, global = true, value_name = "PATH")]
    pub workbook: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Value the portfolio, sync the workbook, then regenerate the dashboard.
    Sync {
        /// JSON object of symbol to price; skips live lookups.
        #[arg(long, value_name = "FILE")]
        prices: Option<PathBuf>,

        /// Sync time, `YYYY-MM-DD[ HH:MM:SS]`. Defaults to now.
        #[arg(long, value_name = "TIMESTAMP", value_parser = parse_timestamp)]
        at: Option<NaiveDateTime>,
    },
    /// Check schema, Daily integrity and the Chart mirror without writing.
    Audit,
    /// Regenerate dashboard JSON from the workbook as it is.
    Export,
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid timestamp {:?}, expected YYYY-MM-DD[ HH:MM:SS]", value))
}

pub async fn run(cli: Cli, config: &Config) -> anyhow::Result<()> {
    let workbook_path = cli.workbook.unwrap_or_else(|| config.workbook_path.clone());
    let service = WorkbookSyncService::new(&workbook_path);

    match cli.command {
        Command::Sync { prices, at } => {
            let meta = run_sync(&service, config, prices.as_deref(), at).await?;
            println!(
                "Synced {} through {} ({} daily rows, backup {})",
                workbook_path.display(),
                meta.last_daily_date,
                meta.daily_count,
                meta.backup_path.display()
            );
        }
        Command::Audit => run_audit(&service)?,
        Command::Export => {
            let workbook = service.load()?;
            export_dashboard(&workbook, config).await?;
        }
    }
    Ok(())
}

/// Values the portfolio, syncs the workbook and regenerates the dashboard.
/// The dashboard is only written once the sync has committed.
pub async fn run_sync(
    service: &WorkbookSyncService,
    config: &Config,
    prices_override: Option<&Path>,
    at: Option<NaiveDateTime>,
) -> anyhow::Result<SyncMetadata> {
    let portfolio = PortfolioConfig::from_path(&config.portfolio_path)
        .with_context(|| format!("loading portfolio {}", config.portfolio_path.display()))?;

    let provider = price_provider(config, prices_override)?;
    let prices = fetch_prices(provider.as_ref(), &portfolio.quote_symbols()).await?;
    let valuation = value_portfolio(&portfolio, &prices)?;
    tracing::info!("Portfolio valued at {} USD", valuation.total_balance);

    let sync_time = at.unwrap_or_else(|| Local::now().naive_local());
    let request = valuation.into_sync_request(sync_time);
    let meta = service.sync(&request)?;

    let workbook = service.load()?;
    export_dashboard(&workbook, config).await?;
    Ok(meta)
}

fn price_provider(
    config: &Config,
    prices_override: Option<&Path>,
) -> anyhow::Result<Box<dyn PriceProvider>> {
    let static_path = match (prices_override, config.price_source) {
        (Some(path), _) => path,
        (None, PriceSource::Static) => config.prices_path.as_path(),
        (None, PriceSource::Yahoo) => return Ok(Box::new(YahooPriceProvider::new()?)),
    };
    let provider = StaticPriceProvider::from_path(static_path)?;
    tracing::debug!("Loaded {} static prices", provider.len());
    Ok(Box::new(provider))
}

/// Builds the briefing and dashboard payload from `workbook` and writes
/// every configured dashboard file.
pub async fn export_dashboard(workbook: &Workbook, config: &Config) -> anyhow::Result<()> {
    let holdings = read_dashboard_holdings(workbook)?;
    let holdings_json = holdings
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    let input = match &config.news_path {
        Some(path) => BriefingInput::from_news_path(path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring news context: {}", e);
            BriefingInput::default()
        }),
        None => BriefingInput::default(),
    }
    .with_holdings(holdings_json);

    let briefing = generate_briefing(&TemplateBriefingGenerator, &input, Utc::now()).await;
    let payload = build_dashboard(workbook, Local::now().naive_local(), briefing)?;
    write_dashboard(&payload, &config.dashboard_paths)?;
    Ok(())
}

fn run_audit(service: &WorkbookSyncService) -> anyhow::Result<()> {
    let report = service.audit()?;
    println!("Workbook:  {}", service.workbook_path().display());
    println!(
        "Daily:     {} rows, {} .. {}",
        report.daily_count, report.first_date, report.last_date
    );
    println!(
        "Latest:    total {} USD, nav {}",
        report.last_total_usd, report.last_nav
    );
    println!("Chart:     {} rows (matches Daily)", report.chart_count);
    println!("Holdings:  {} rows", report.holdings_count);
    Ok(())
}
