//! Runway and cash-out date from cash position and net burn

use crate::error::{ensure_non_negative, EngineError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Runway reported when the business is not burning cash
pub const INFINITE_RUNWAY_MONTHS: f64 = 999.0;

/// Cash-out horizon used with the infinite runway sentinel (~100 years)
pub const INFINITE_RUNWAY_DAYS: u64 = 36_500;

/// Average days per calendar month used to turn runway into a date
pub const AVG_DAYS_PER_MONTH: f64 = 30.44;

/// Burn and runway for a cash position at a reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnAnalysis {
    /// Gross monthly outflow
    pub monthly_burn_cents: i64,

    /// Gross monthly inflow
    pub monthly_revenue_cents: i64,

    /// Burn minus revenue, floored at zero
    pub net_burn_cents: i64,

    /// Months of cash left, one decimal place. 999.0 means not burning.
    pub runway_months: f64,

    /// Date the cash position reaches zero at the current net burn
    pub cash_out_date: NaiveDate,

    pub avg_daily_burn_cents: i64,
}

impl BurnAnalysis {
    /// True when runway carries the "not burning cash" sentinel
    ///
    /// Callers must check this before doing arithmetic on `runway_months`.
    pub fn is_infinite(&self) -> bool {
        self.net_burn_cents == 0
    }

    /// Runway in months, or `None` for the infinite sentinel
    pub fn finite_runway_months(&self) -> Option<f64> {
        if self.is_infinite() {
            None
        } else {
            Some(self.runway_months)
        }
    }

    pub fn zone(&self) -> RunwayZone {
        if self.is_infinite() {
            RunwayZone::Healthy
        } else {
            RunwayZone::classify(self.runway_months)
        }
    }
}

/// Dashboard severity band for a runway figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwayZone {
    /// Under 3 months
    Critical,
    /// 3 to 6 months
    Warning,
    /// 6 to 12 months
    Comfortable,
    /// 12 months or more
    Healthy,
}

impl RunwayZone {
    pub fn classify(runway_months: f64) -> Self {
        if runway_months < 3.0 {
            RunwayZone::Critical
        } else if runway_months < 6.0 {
            RunwayZone::Warning
        } else if runway_months < 12.0 {
            RunwayZone::Comfortable
        } else {
            RunwayZone::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunwayZone::Critical => "critical",
            RunwayZone::Warning => "warning",
            RunwayZone::Comfortable => "comfortable",
            RunwayZone::Healthy => "healthy",
        }
    }
}

/// Round a runway ratio to one decimal place for display
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn add_days(reference_date: NaiveDate, days: u64) -> Result<NaiveDate> {
    reference_date
        .checked_add_days(Days::new(days))
        .ok_or(EngineError::Overflow("cash-out date"))
}

/// Compute runway in months and the cash-out date
///
/// Net burn is `monthly_burn_cents - monthly_revenue_cents`. A net burn of
/// zero or less returns the infinite sentinel regardless of cash. Otherwise
/// the runway is `cash / net_burn`, rounded to one decimal for display.
///
/// The cash-out date is derived from the unrounded quotient, so it is not
/// always reproducible from the displayed `runway_months`.
///
/// `monthly_burn_cents` may be negative: the optimized path subtracts
/// savings without clamping and relies on the sentinel branch here.
pub fn compute_runway(
    cash_position_cents: i64,
    monthly_burn_cents: i64,
    monthly_revenue_cents: i64,
    reference_date: NaiveDate,
) -> Result<BurnAnalysis> {
    ensure_non_negative("monthly_revenue_cents", monthly_revenue_cents)?;

    let net_burn = monthly_burn_cents
        .checked_sub(monthly_revenue_cents)
        .ok_or(EngineError::Overflow("net burn"))?;

    if net_burn <= 0 {
        log::debug!(
            "Net burn {} <= 0 (burn {}, revenue {}); runway is unbounded",
            net_burn,
            monthly_burn_cents,
            monthly_revenue_cents
        );
        return Ok(BurnAnalysis {
            monthly_burn_cents,
            monthly_revenue_cents,
            net_burn_cents: 0,
            runway_months: INFINITE_RUNWAY_MONTHS,
            cash_out_date: add_days(reference_date, INFINITE_RUNWAY_DAYS)?,
            avg_daily_burn_cents: 0,
        });
    }

    // An overdrawn position has already run out
    let runway_raw = (cash_position_cents as f64 / net_burn as f64).max(0.0);
    let days_remaining = (runway_raw * AVG_DAYS_PER_MONTH).floor() as u64;
    let avg_daily_burn = net_burn
        .checked_mul(12)
        .ok_or(EngineError::Overflow("average daily burn"))?
        / 365;

    Ok(BurnAnalysis {
        monthly_burn_cents,
        monthly_revenue_cents,
        net_burn_cents: net_burn,
        runway_months: round_to_tenth(runway_raw),
        cash_out_date: add_days(reference_date, days_remaining)?,
        avg_daily_burn_cents: avg_daily_burn,
    })
}
