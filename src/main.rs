//! Cash-flow engine CLI
//!
//! Command-line interface for running burn, runway, forecast and DSO figures

use anyhow::{Context, Result};
use cashflow_engine::aggregates::{load_actions, load_aggregates};
use cashflow_engine::engine::{compute_dso, compute_runway, forecast_cash_flow, BurnAnalysis, ForecastPoint};
use cashflow_engine::snapshot::{build_snapshot, FinancialSnapshot, Receivables, SnapshotConfig, SnapshotInputs};
use cashflow_engine::format_cents;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cashflow", version, about = "Burn, runway and cash-flow forecasts from monthly aggregates")]
struct Cli {
    /// JSON config file (lookback, horizon, growth, DSO period, scenarios)
    #[arg(long, global = true, env = "CASHFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true, env = "CASHFLOW_AS_OF")]
    as_of: Option<NaiveDate>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Overrides {
    /// Trailing months averaged into the burn rate
    #[arg(long, env = "CASHFLOW_LOOKBACK_MONTHS")]
    lookback_months: Option<u32>,

    /// Forecast horizon in months
    #[arg(long, env = "CASHFLOW_MONTHS_AHEAD")]
    months_ahead: Option<u32>,

    /// Monthly inflow growth in percent
    #[arg(long, env = "CASHFLOW_GROWTH_PCT", allow_negative_numbers = true)]
    growth_pct: Option<f64>,

    /// Revenue period for DSO in days
    #[arg(long, env = "CASHFLOW_DSO_PERIOD_DAYS")]
    period_days: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Full dashboard snapshot from a monthly aggregates CSV
    Snapshot {
        /// CSV with columns month,inflow_cents,outflow_cents
        #[arg(long)]
        aggregates: PathBuf,

        /// Current cash position in cents
        #[arg(long, allow_negative_numbers = true)]
        cash: i64,

        /// JSON array of proposed optimization actions
        #[arg(long)]
        actions: Option<PathBuf>,

        /// Outstanding receivables in cents (enables DSO)
        #[arg(long, requires = "period_revenue")]
        receivables: Option<i64>,

        /// Revenue booked over the DSO period in cents
        #[arg(long, requires = "receivables")]
        period_revenue: Option<i64>,

        /// Owner's estimate of monthly burn in cents
        #[arg(long)]
        estimated_burn: Option<i64>,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Runway from explicit burn and revenue
    Runway {
        #[arg(long, allow_negative_numbers = true)]
        cash: i64,
        #[arg(long)]
        burn: i64,
        #[arg(long)]
        revenue: i64,
    },
    /// Forecast from explicit monthly inflow and outflow
    Forecast {
        #[arg(long, allow_negative_numbers = true)]
        cash: i64,
        #[arg(long)]
        inflow: i64,
        #[arg(long)]
        outflow: i64,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Days Sales Outstanding
    Dso {
        #[arg(long)]
        receivables: i64,
        #[arg(long)]
        revenue: i64,
        #[command(flatten)]
        overrides: Overrides,
    },
}

fn load_config(path: Option<&PathBuf>, overrides: &Overrides) -> Result<SnapshotConfig> {
    let mut config = match path {
        Some(p) => SnapshotConfig::from_json_path(p)
            .with_context(|| format!("Failed to load config from {}", p.display()))?,
        None => SnapshotConfig::default(),
    };

    if let Some(v) = overrides.lookback_months {
        config.lookback_months = v;
    }
    if let Some(v) = overrides.months_ahead {
        config.months_ahead = v;
    }
    if let Some(v) = overrides.growth_pct {
        config.growth_rate_pct = v;
    }
    if let Some(v) = overrides.period_days {
        config.dso_period_days = v;
    }

    log::debug!("Using config {:?}", config);
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_burn(burn: &BurnAnalysis) {
    println!("Burn & Runway:");
    println!("  Monthly Burn:    {:>16}", format_cents(burn.monthly_burn_cents));
    println!("  Monthly Revenue: {:>16}", format_cents(burn.monthly_revenue_cents));
    println!("  Net Burn:        {:>16}", format_cents(burn.net_burn_cents));
    println!("  Avg Daily Burn:  {:>16}", format_cents(burn.avg_daily_burn_cents));
    if burn.is_infinite() {
        println!("  Runway:          {:>16}", "not burning");
    } else {
        println!("  Runway:          {:>13.1} mo", burn.runway_months);
        println!("  Cash-out Date:   {:>16}", burn.cash_out_date.to_string());
    }
    println!("  Zone:            {:>16}", burn.zone().as_str());
}

fn print_forecast(points: &[ForecastPoint]) {
    println!("{:>5} {:>16} {:>16} {:>16} {:>18}", "Month", "Inflow", "Outflow", "Net", "Balance");
    println!("{}", "-".repeat(75));
    for p in points {
        println!(
            "{:>5} {:>16} {:>16} {:>16} {:>18}",
            p.month_offset,
            format_cents(p.inflow_cents),
            format_cents(p.outflow_cents),
            format_cents(p.net_cents),
            format_cents(p.balance_cents),
        );
    }
}

fn print_snapshot(snapshot: &FinancialSnapshot) {
    println!("Snapshot as of {} ({} months of history)", snapshot.reference_date, snapshot.months_in_window);
    println!();
    print_burn(&snapshot.burn);

    if let Some(delta) = snapshot.burn_delta_cents {
        println!("  Burn vs Estimate:{:>16}", format_cents(delta));
    }
    if let Some(growth) = snapshot.inflow_growth_pct {
        println!("  Inflow MoM:      {:>14.1} %", growth);
    }
    if let Some(dso) = snapshot.dso_days {
        println!("  DSO:             {:>11} days", dso);
    }

    let opt = &snapshot.optimized;
    println!("\nOptimized ({} actions):", opt.actions.len());
    println!("  Monthly Savings: {:>16}", format_cents(opt.total_monthly_savings_cents));
    println!("  One-time Cash:   {:>16}", format_cents(opt.total_one_time_recovery_cents));
    if opt.optimized_burn_cents == 0 {
        println!("  Runway:          {:>16}", "not burning");
    } else {
        println!("  Runway:          {:>13.1} mo", opt.optimized_runway_months);
        println!("  Cash-out Date:   {:>16}", opt.optimized_cash_out_date.to_string());
    }

    for impact in &snapshot.action_impacts {
        let effect = match impact.delta_runway_months {
            _ if impact.reaches_break_even => "break-even".to_string(),
            Some(delta) => format!("{:+.1} mo", delta),
            None => "-".to_string(),
        };
        println!("    [{:<18}] {:<40} {}", impact.action.category.as_str(), impact.action.description, effect);
    }

    println!("\nForecast:");
    print_forecast(&snapshot.forecast);
    if let Some(month) = snapshot.forecast_cash_out_month {
        println!("Balance goes negative in month {}", month);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let reference_date = cli.as_of.unwrap_or_else(|| Local::now().date_naive());

    match &cli.command {
        Command::Snapshot {
            aggregates,
            cash,
            actions,
            receivables,
            period_revenue,
            estimated_burn,
            overrides,
        } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            let aggregates = load_aggregates(aggregates)
                .with_context(|| format!("Failed to load aggregates from {}", aggregates.display()))?;
            let actions = match actions {
                Some(path) => load_actions(path)
                    .with_context(|| format!("Failed to load actions from {}", path.display()))?,
                None => Vec::new(),
            };
            let receivables = match (receivables, period_revenue) {
                (Some(r), Some(p)) => Some(Receivables {
                    total_receivables_cents: *r,
                    period_revenue_cents: *p,
                }),
                _ => None,
            };

            let inputs = SnapshotInputs {
                aggregates,
                cash_position_cents: *cash,
                actions,
                receivables,
                estimated_burn_cents: *estimated_burn,
            };
            let snapshot = build_snapshot(&inputs, &config, reference_date)?;

            if cli.json {
                print_json(&snapshot)?;
            } else {
                print_snapshot(&snapshot);
            }
        }
        Command::Runway { cash, burn, revenue } => {
            let analysis = compute_runway(*cash, *burn, *revenue, reference_date)?;
            if cli.json {
                print_json(&analysis)?;
            } else {
                print_burn(&analysis);
            }
        }
        Command::Forecast {
            cash,
            inflow,
            outflow,
            overrides,
        } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            let points = forecast_cash_flow(*cash, *inflow, *outflow, config.months_ahead, config.growth_rate_pct)?;
            if cli.json {
                print_json(&points)?;
            } else {
                print_forecast(&points);
            }
        }
        Command::Dso {
            receivables,
            revenue,
            overrides,
        } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            let days = compute_dso(*receivables, *revenue, config.dso_period_days)?;
            if cli.json {
                print_json(&serde_json::json!({ "dso_days": days }))?;
            } else {
                println!("DSO: {} days", days);
            }
        }
    }

    Ok(())
}
