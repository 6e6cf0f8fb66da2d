//! Cash-flow engine - deterministic burn, runway and forecast figures for small-business dashboards
//!
//! This library provides:
//! - Burn rate averaging over a trailing window of monthly aggregates
//! - Runway and cash-out date, with an explicit "not burning" sentinel
//! - Optimized runway under proposed savings and collection actions
//! - Days Sales Outstanding
//! - Forward cash-flow forecasts with compounding inflow growth
//!
//! All money is integer cents. The reference date is always passed in; the
//! binaries are the only place the wall clock is read.

pub mod error;
pub mod aggregates;
pub mod engine;
pub mod snapshot;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use aggregates::{MonthKey, MonthlyAggregates, MonthlyFlow};
pub use engine::{
    compute_burn_rate, compute_dso, compute_optimized_runway, compute_runway, forecast_cash_flow,
    BurnAnalysis, ForecastPoint, OptimizationAction, OptimizedRunway,
};
pub use snapshot::{build_snapshot, FinancialSnapshot, SnapshotConfig, SnapshotInputs, SnapshotRunner};

/// Render cents as a dollar string, e.g. `-$1,234.56`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, abs % 100)
}
