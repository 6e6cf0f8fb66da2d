//! Dashboard snapshot: the engine wired together for one tenant
//!
//! Averages the trailing months, derives runway, applies proposed actions,
//! and forecasts forward. The runner evaluates many tenants in parallel with
//! a shared configuration.

use crate::aggregates::MonthlyAggregates;
use crate::engine::{
    compute_burn_rate, compute_dso, compute_optimized_runway, compute_runway,
    first_negative_month, forecast_cash_flow, forecast_scenarios, rank_actions, ActionImpact,
    BurnAnalysis, ForecastPoint, ForecastScenarios, OptimizationAction, OptimizedRunway,
    RunwayZone, ScenarioGrowth, DEFAULT_DSO_PERIOD_DAYS, DEFAULT_LOOKBACK_MONTHS,
    DEFAULT_MONTHS_AHEAD,
};
use crate::error::{ensure_non_negative, EngineError, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Knobs shared by every snapshot in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Trailing months averaged into the burn rate
    pub lookback_months: u32,

    /// Forecast horizon
    pub months_ahead: u32,

    /// Monthly inflow growth for the primary forecast, in percent
    pub growth_rate_pct: f64,

    /// Revenue period used for DSO
    pub dso_period_days: u32,

    pub scenario_growth: ScenarioGrowth,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            months_ahead: DEFAULT_MONTHS_AHEAD,
            growth_rate_pct: 0.0,
            dso_period_days: DEFAULT_DSO_PERIOD_DAYS,
            scenario_growth: ScenarioGrowth::default(),
        }
    }
}

impl SnapshotConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Outstanding receivables and the revenue booked over the DSO period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receivables {
    pub total_receivables_cents: i64,
    pub period_revenue_cents: i64,
}

/// Everything the aggregation layer supplies for one tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInputs {
    pub aggregates: MonthlyAggregates,
    pub cash_position_cents: i64,

    #[serde(default)]
    pub actions: Vec<OptimizationAction>,

    #[serde(default)]
    pub receivables: Option<Receivables>,

    /// What the owner believes monthly burn is
    #[serde(default)]
    pub estimated_burn_cents: Option<i64>,
}

/// Dashboard figures for one tenant at a reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub reference_date: NaiveDate,

    /// Months that actually fed the burn averages
    pub months_in_window: usize,
    pub avg_monthly_inflow_cents: i64,
    pub avg_monthly_outflow_cents: i64,

    pub burn: BurnAnalysis,
    pub zone: RunwayZone,
    pub optimized: OptimizedRunway,
    pub action_impacts: Vec<ActionImpact>,

    pub forecast: Vec<ForecastPoint>,
    pub scenarios: ForecastScenarios,

    /// First forecast month with a negative balance
    pub forecast_cash_out_month: Option<u32>,

    pub dso_days: Option<i64>,

    /// Actual gross burn minus the owner's estimate
    pub burn_delta_cents: Option<i64>,

    /// Latest month-over-month inflow change, one decimal place
    pub inflow_growth_pct: Option<f64>,
}

/// Month-over-month inflow growth between the two most recent months
///
/// `None` with fewer than two months or a zero prior month.
pub fn latest_inflow_growth_pct(aggregates: &MonthlyAggregates) -> Option<f64> {
    let mut recent = aggregates.values().rev();
    let latest = recent.next()?;
    let prior = recent.next()?;
    if prior.inflow_cents == 0 {
        return None;
    }

    let change = (latest.inflow_cents - prior.inflow_cents) as f64 / prior.inflow_cents as f64;
    Some((change * 1000.0).round() / 10.0)
}

/// Build the full dashboard snapshot for one tenant
pub fn build_snapshot(
    inputs: &SnapshotInputs,
    config: &SnapshotConfig,
    reference_date: NaiveDate,
) -> Result<FinancialSnapshot> {
    let (avg_inflow, avg_outflow) = compute_burn_rate(&inputs.aggregates, config.lookback_months)?;
    let months_in_window = inputs.aggregates.len().min(config.lookback_months as usize);

    let burn = compute_runway(inputs.cash_position_cents, avg_outflow, avg_inflow, reference_date)?;
    let optimized = compute_optimized_runway(
        &burn,
        inputs.cash_position_cents,
        &inputs.actions,
        reference_date,
    )?;
    let action_impacts = rank_actions(
        &burn,
        inputs.cash_position_cents,
        &inputs.actions,
        reference_date,
    )?;

    let forecast = forecast_cash_flow(
        inputs.cash_position_cents,
        avg_inflow,
        avg_outflow,
        config.months_ahead,
        config.growth_rate_pct,
    )?;
    let scenarios = forecast_scenarios(
        inputs.cash_position_cents,
        avg_inflow,
        avg_outflow,
        config.months_ahead,
        &config.scenario_growth,
    )?;

    let dso_days = inputs
        .receivables
        .map(|r| compute_dso(r.total_receivables_cents, r.period_revenue_cents, config.dso_period_days))
        .transpose()?;

    let burn_delta_cents = inputs
        .estimated_burn_cents
        .map(|estimate| {
            ensure_non_negative("estimated_burn_cents", estimate)?;
            burn.monthly_burn_cents
                .checked_sub(estimate)
                .ok_or(EngineError::Overflow("burn delta"))
        })
        .transpose()?;

    log::info!(
        "Snapshot at {}: net burn {} cents/month, runway {} months ({})",
        reference_date,
        burn.net_burn_cents,
        burn.runway_months,
        burn.zone().as_str()
    );

    Ok(FinancialSnapshot {
        reference_date,
        months_in_window,
        avg_monthly_inflow_cents: avg_inflow,
        avg_monthly_outflow_cents: avg_outflow,
        zone: burn.zone(),
        burn,
        optimized,
        action_impacts,
        forecast_cash_out_month: first_negative_month(&forecast),
        forecast,
        scenarios,
        dso_days,
        burn_delta_cents,
        inflow_growth_pct: latest_inflow_growth_pct(&inputs.aggregates),
    })
}

/// Inputs for one tenant in a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantInputs {
    pub tenant: String,
    pub inputs: SnapshotInputs,
}

/// Outcome for one tenant in a batch run
#[derive(Debug)]
pub struct TenantSnapshot {
    pub tenant: String,
    pub result: Result<FinancialSnapshot>,
}

/// Snapshot runner with a shared configuration
///
/// # Example
/// ```ignore
/// let runner = SnapshotRunner::new(SnapshotConfig::default());
/// let snapshot = runner.run(&inputs, today)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotRunner {
    config: SnapshotConfig,
}

impl SnapshotRunner {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, inputs: &SnapshotInputs, reference_date: NaiveDate) -> Result<FinancialSnapshot> {
        build_snapshot(inputs, &self.config, reference_date)
    }

    /// Run snapshots for many tenants in parallel
    ///
    /// One tenant's bad data does not stop the others; results keep input order.
    pub fn run_batch(&self, tenants: &[TenantInputs], reference_date: NaiveDate) -> Vec<TenantSnapshot> {
        tenants
            .par_iter()
            .map(|t| TenantSnapshot {
                tenant: t.tenant.clone(),
                result: self.run(&t.inputs, reference_date),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::aggregates_from_pairs;
    use crate::engine::ActionCategory;
    use approx::assert_abs_diff_eq;

    fn feb_1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    fn demo_inputs() -> SnapshotInputs {
        SnapshotInputs {
            aggregates: aggregates_from_pairs([
                ("2025-11", (185_000_00, 265_000_00)),
                ("2025-12", (190_000_00, 270_000_00)),
                ("2026-01", (200_000_00, 280_000_00)),
            ])
            .unwrap(),
            cash_position_cents: 1_000_000_00,
            actions: vec![
                OptimizationAction::new(
                    "Collect overdue invoices",
                    0,
                    94_000_00,
                    ActionCategory::InvoiceCollection,
                ),
                OptimizationAction::new(
                    "Cancel unused SaaS",
                    2_800_00,
                    0,
                    ActionCategory::SubscriptionCut,
                ),
            ],
            receivables: Some(Receivables {
                total_receivables_cents: 94_000_00,
                period_revenue_cents: 600_000_00,
            }),
            estimated_burn_cents: Some(240_000_00),
        }
    }

    #[test]
    fn test_snapshot_wires_engine() {
        let snapshot = build_snapshot(&demo_inputs(), &SnapshotConfig::default(), feb_1()).unwrap();

        assert_eq!(snapshot.months_in_window, 3);
        assert_eq!(snapshot.avg_monthly_inflow_cents, 191_666_66);
        assert_eq!(snapshot.avg_monthly_outflow_cents, 271_666_66);
        assert_eq!(snapshot.burn.net_burn_cents, 80_000_00);
        // 1M / 80K = 12.5
        assert_abs_diff_eq!(snapshot.burn.runway_months, 12.5, epsilon = 1e-12);
        assert_eq!(snapshot.zone, RunwayZone::Healthy);
        assert!(snapshot.optimized.optimized_runway_months > snapshot.burn.runway_months);
        assert_eq!(snapshot.action_impacts.len(), 2);
        assert_eq!(snapshot.forecast.len(), DEFAULT_MONTHS_AHEAD as usize);
        assert_eq!(snapshot.forecast_cash_out_month, None);
        assert_eq!(snapshot.dso_days, Some(14));
        assert_eq!(snapshot.burn_delta_cents, Some(271_666_66 - 240_000_00));
        // 190K -> 200K
        assert_abs_diff_eq!(snapshot.inflow_growth_pct.unwrap(), 5.3, epsilon = 1e-12);
    }

    #[test]
    fn test_snapshot_without_history() {
        let inputs = SnapshotInputs {
            cash_position_cents: 50_000_00,
            ..Default::default()
        };
        let snapshot = build_snapshot(&inputs, &SnapshotConfig::default(), feb_1()).unwrap();

        assert_eq!(snapshot.months_in_window, 0);
        assert!(snapshot.burn.is_infinite());
        assert_eq!(snapshot.dso_days, None);
        assert_eq!(snapshot.burn_delta_cents, None);
        assert_eq!(snapshot.inflow_growth_pct, None);
        assert!(snapshot.forecast.iter().all(|p| p.balance_cents == 50_000_00));
    }

    #[test]
    fn test_negative_burn_estimate_rejected() {
        let mut inputs = demo_inputs();
        inputs.estimated_burn_cents = Some(-1);

        let err = build_snapshot(&inputs, &SnapshotConfig::default(), feb_1()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidArgument { name: "estimated_burn_cents", .. }
        ));
    }

    #[test]
    fn test_burn_delta_at_range_limits() {
        // burn - i64::MIN would overflow; the estimate is refused before subtracting
        let mut inputs = demo_inputs();
        inputs.estimated_burn_cents = Some(i64::MIN);
        let err = build_snapshot(&inputs, &SnapshotConfig::default(), feb_1()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidArgument { name: "estimated_burn_cents", .. }
        ));

        inputs.estimated_burn_cents = Some(i64::MAX);
        let snapshot = build_snapshot(&inputs, &SnapshotConfig::default(), feb_1()).unwrap();
        assert_eq!(snapshot.burn_delta_cents, Some(271_666_66 - i64::MAX));
    }

    #[test]
    fn test_inflow_growth_needs_nonzero_prior() {
        let aggregates =
            aggregates_from_pairs([("2025-12", (0, 10)), ("2026-01", (100, 10))]).unwrap();
        assert_eq!(latest_inflow_growth_pct(&aggregates), None);

        let aggregates = aggregates_from_pairs([("2026-01", (100, 10))]).unwrap();
        assert_eq!(latest_inflow_growth_pct(&aggregates), None);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: SnapshotConfig = serde_json::from_str(r#"{"lookback_months": 3}"#).unwrap();
        assert_eq!(config.lookback_months, 3);
        assert_eq!(config.months_ahead, DEFAULT_MONTHS_AHEAD);
        assert_eq!(config.dso_period_days, DEFAULT_DSO_PERIOD_DAYS);
        assert_eq!(config.scenario_growth, ScenarioGrowth::default());
    }

    #[test]
    fn test_inputs_deserialize_from_json() {
        let json = r#"{
            "aggregates": {"2026-01": {"inflow_cents": 100, "outflow_cents": 300}},
            "cash_position_cents": 1000
        }"#;
        let inputs: SnapshotInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs.aggregates.len(), 1);
        assert!(inputs.actions.is_empty());
        assert_eq!(inputs.receivables, None);
    }

    #[test]
    fn test_run_batch_isolates_failures() {
        let runner = SnapshotRunner::new(SnapshotConfig::default());

        let mut bad = demo_inputs();
        bad.actions[0].monthly_savings_cents = -1;

        let tenants = vec![
            TenantInputs { tenant: "acme".to_string(), inputs: demo_inputs() },
            TenantInputs { tenant: "broken".to_string(), inputs: bad },
            TenantInputs { tenant: "globex".to_string(), inputs: demo_inputs() },
        ];

        let results = runner.run_batch(&tenants, feb_1());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].tenant, "acme");
        assert!(results[0].result.is_ok());
        assert_eq!(results[1].tenant, "broken");
        assert!(results[1].result.is_err());
        assert!(results[2].result.is_ok());
    }
}
