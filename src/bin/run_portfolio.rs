//! Run dashboard snapshots for every tenant in a portfolio export
//!
//! Inputs: a tenant-keyed aggregates CSV and a cash positions CSV.
//! Output: one summary row per tenant.

use anyhow::{Context, Result};
use cashflow_engine::aggregates::{load_cash_positions, load_portfolio};
use cashflow_engine::snapshot::{SnapshotConfig, SnapshotInputs, SnapshotRunner, TenantInputs};
use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "run_portfolio", about = "Parallel burn/runway snapshots for many tenants")]
struct Cli {
    /// CSV with columns tenant,month,inflow_cents,outflow_cents
    #[arg(long, default_value = "portfolio_aggregates.csv")]
    aggregates: PathBuf,

    /// CSV with columns tenant,cash_position_cents
    #[arg(long, default_value = "portfolio_cash.csv")]
    cash: PathBuf,

    /// JSON config file
    #[arg(long, env = "CASHFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long, env = "CASHFLOW_AS_OF")]
    as_of: Option<NaiveDate>,

    #[arg(long, default_value = "portfolio_snapshot.csv")]
    output: PathBuf,
}

/// One output row per tenant
#[derive(Debug, Serialize)]
struct SummaryRow {
    tenant: String,
    months: usize,
    cash_position_cents: i64,
    avg_inflow_cents: i64,
    avg_outflow_cents: i64,
    net_burn_cents: i64,
    runway_months: Option<f64>,
    cash_out_date: Option<NaiveDate>,
    zone: String,
    forecast_end_balance_cents: Option<i64>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let reference_date = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let config = match &cli.config {
        Some(path) => SnapshotConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SnapshotConfig::default(),
    };

    let start = Instant::now();
    println!("Loading portfolio from {}...", cli.aggregates.display());

    let portfolio = load_portfolio(&cli.aggregates)
        .with_context(|| format!("Failed to load {}", cli.aggregates.display()))?;
    let mut cash_positions = load_cash_positions(&cli.cash)
        .with_context(|| format!("Failed to load {}", cli.cash.display()))?;
    println!("Loaded {} tenants in {:?}", portfolio.len(), start.elapsed());

    let tenants: Vec<TenantInputs> = portfolio
        .into_iter()
        .map(|(tenant, aggregates)| {
            let cash_position_cents = cash_positions.remove(&tenant).unwrap_or_else(|| {
                log::warn!("No cash position for tenant '{}'; assuming zero", tenant);
                0
            });
            TenantInputs {
                tenant,
                inputs: SnapshotInputs {
                    aggregates,
                    cash_position_cents,
                    ..Default::default()
                },
            }
        })
        .collect();

    for tenant in cash_positions.keys() {
        log::warn!("Cash position for '{}' has no aggregates; skipped", tenant);
    }

    println!("Running snapshots...");
    let run_start = Instant::now();
    let runner = SnapshotRunner::new(config);
    let results = runner.run_batch(&tenants, reference_date);
    println!("Snapshots complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let mut failures = 0;

    for (input, outcome) in tenants.iter().zip(&results) {
        let row = match &outcome.result {
            Ok(snapshot) => SummaryRow {
                tenant: outcome.tenant.clone(),
                months: snapshot.months_in_window,
                cash_position_cents: input.inputs.cash_position_cents,
                avg_inflow_cents: snapshot.avg_monthly_inflow_cents,
                avg_outflow_cents: snapshot.avg_monthly_outflow_cents,
                net_burn_cents: snapshot.burn.net_burn_cents,
                runway_months: snapshot.burn.finite_runway_months(),
                cash_out_date: (!snapshot.burn.is_infinite()).then_some(snapshot.burn.cash_out_date),
                zone: snapshot.zone.as_str().to_string(),
                forecast_end_balance_cents: snapshot.forecast.last().map(|p| p.balance_cents),
                error: None,
            },
            Err(e) => {
                failures += 1;
                log::error!("Tenant '{}' failed: {}", outcome.tenant, e);
                SummaryRow {
                    tenant: outcome.tenant.clone(),
                    months: input.inputs.aggregates.len(),
                    cash_position_cents: input.inputs.cash_position_cents,
                    avg_inflow_cents: 0,
                    avg_outflow_cents: 0,
                    net_burn_cents: 0,
                    runway_months: None,
                    cash_out_date: None,
                    zone: String::new(),
                    forecast_end_balance_cents: None,
                    error: Some(e.to_string()),
                }
            }
        };
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Output written to {}", cli.output.display());
    println!("\nPortfolio Summary:");
    println!("  Tenants:  {}", results.len());
    println!("  Failures: {}", failures);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
