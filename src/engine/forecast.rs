//! Forward cash-flow forecast with compounding inflow growth

use crate::error::{ensure_non_negative, EngineError, Result};
use serde::{Deserialize, Serialize};

/// Default forecast horizon in months
pub const DEFAULT_MONTHS_AHEAD: u32 = 6;

/// One forecast month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based month offset from the forecast start
    pub month_offset: u32,
    pub inflow_cents: i64,
    pub outflow_cents: i64,
    pub net_cents: i64,
    /// Running balance after this month
    pub balance_cents: i64,
    pub is_forecast: bool,
}

fn validate_growth(name: &'static str, growth_rate_pct: f64) -> Result<()> {
    if !growth_rate_pct.is_finite() {
        return Err(EngineError::invalid(name, "must be a finite percentage"));
    }
    if growth_rate_pct < -100.0 {
        return Err(EngineError::invalid(
            name,
            format!("cannot shrink inflow by more than 100%, got {}", growth_rate_pct),
        ));
    }
    Ok(())
}

/// Project monthly cash flow `months_ahead` months forward
///
/// Inflow compounds by `growth_rate_pct` per month starting with month 2;
/// month 1 always uses `monthly_inflow_cents` unchanged. Each grown inflow is
/// floored to whole cents before the next month compounds on it. Outflow is
/// held constant.
pub fn forecast_cash_flow(
    cash_position_cents: i64,
    monthly_inflow_cents: i64,
    monthly_outflow_cents: i64,
    months_ahead: u32,
    growth_rate_pct: f64,
) -> Result<Vec<ForecastPoint>> {
    ensure_non_negative("monthly_inflow_cents", monthly_inflow_cents)?;
    ensure_non_negative("monthly_outflow_cents", monthly_outflow_cents)?;
    validate_growth("growth_rate_pct", growth_rate_pct)?;

    let growth_factor = 1.0 + growth_rate_pct / 100.0;
    let mut forecast = Vec::with_capacity(months_ahead as usize);
    let mut balance = cash_position_cents;
    let mut current_inflow = monthly_inflow_cents;

    for i in 0..months_ahead {
        if i > 0 {
            let grown = (current_inflow as f64 * growth_factor).floor();
            if grown >= i64::MAX as f64 {
                return Err(EngineError::Overflow("forecast inflow"));
            }
            current_inflow = grown as i64;
        }

        let net = current_inflow - monthly_outflow_cents;
        balance = balance
            .checked_add(net)
            .ok_or(EngineError::Overflow("forecast balance"))?;

        forecast.push(ForecastPoint {
            month_offset: i + 1,
            inflow_cents: current_inflow,
            outflow_cents: monthly_outflow_cents,
            net_cents: net,
            balance_cents: balance,
            is_forecast: true,
        });
    }

    Ok(forecast)
}

/// First month whose closing balance is below zero, if any
pub fn first_negative_month(points: &[ForecastPoint]) -> Option<u32> {
    points
        .iter()
        .find(|p| p.balance_cents < 0)
        .map(|p| p.month_offset)
}

/// Monthly inflow growth rates for the bear / base / bull scenarios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioGrowth {
    pub bear_pct: f64,
    pub base_pct: f64,
    pub bull_pct: f64,
}

impl Default for ScenarioGrowth {
    fn default() -> Self {
        Self {
            bear_pct: -5.0,
            base_pct: 0.0,
            bull_pct: 5.0,
        }
    }
}

/// Forecasts for all three scenarios over the same horizon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastScenarios {
    pub bear: Vec<ForecastPoint>,
    pub base: Vec<ForecastPoint>,
    pub bull: Vec<ForecastPoint>,
}

pub fn forecast_scenarios(
    cash_position_cents: i64,
    monthly_inflow_cents: i64,
    monthly_outflow_cents: i64,
    months_ahead: u32,
    growth: &ScenarioGrowth,
) -> Result<ForecastScenarios> {
    let run = |pct| {
        forecast_cash_flow(
            cash_position_cents,
            monthly_inflow_cents,
            monthly_outflow_cents,
            months_ahead,
            pct,
        )
    };

    Ok(ForecastScenarios {
        bear: run(growth.bear_pct)?,
        base: run(growth.base_pct)?,
        bull: run(growth.bull_pct)?,
    })
}
