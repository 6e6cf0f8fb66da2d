//! Financial computation engine: burn rate, runway, optimization, DSO and forecast
//!
//! Every function here is pure. Money is integer cents; only the runway ratio
//! and growth percentages are real-valued. The reference date is always an
//! explicit argument.

mod burn;
mod runway;
mod optimize;
mod dso;
mod forecast;

pub use burn::{compute_burn_rate, DEFAULT_LOOKBACK_MONTHS};
pub use runway::{
    compute_runway, BurnAnalysis, RunwayZone, AVG_DAYS_PER_MONTH, INFINITE_RUNWAY_DAYS,
    INFINITE_RUNWAY_MONTHS,
};
pub use optimize::{
    compute_optimized_runway, rank_actions, ActionCategory, ActionImpact, OptimizationAction,
    OptimizedRunway,
};
pub use dso::{compute_dso, DEFAULT_DSO_PERIOD_DAYS};
pub use forecast::{
    first_negative_month, forecast_cash_flow, forecast_scenarios, ForecastPoint,
    ForecastScenarios, ScenarioGrowth, DEFAULT_MONTHS_AHEAD,
};
