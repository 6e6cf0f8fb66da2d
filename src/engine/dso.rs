//! Days Sales Outstanding

use crate::error::{ensure_non_negative, EngineError, Result};

/// Default revenue period, in days, for DSO
pub const DEFAULT_DSO_PERIOD_DAYS: u32 = 90;

/// Average days to collect receivables, in whole days
///
/// `daily_revenue = revenue / period_days`, then `receivables / daily_revenue`,
/// both floor divisions. Returns 0 when revenue is zero or too small to give
/// a non-zero daily rate.
pub fn compute_dso(total_receivables_cents: i64, total_revenue_cents: i64, period_days: u32) -> Result<i64> {
    if period_days == 0 {
        return Err(EngineError::invalid("period_days", "must be at least 1"));
    }
    ensure_non_negative("total_receivables_cents", total_receivables_cents)?;
    ensure_non_negative("total_revenue_cents", total_revenue_cents)?;

    if total_revenue_cents == 0 {
        return Ok(0);
    }
    let daily_revenue = total_revenue_cents / period_days as i64;
    if daily_revenue == 0 {
        return Ok(0);
    }
    Ok(total_receivables_cents / daily_revenue)
}
