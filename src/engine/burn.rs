//! Average monthly inflow and outflow over a lookback window

use crate::aggregates::MonthlyAggregates;
use crate::error::{ensure_non_negative, EngineError, Result};

/// Default number of trailing months averaged into the burn rate
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 6;

/// Average monthly inflow and outflow over the most recent `lookback_months`
///
/// Returns `(avg_monthly_inflow_cents, avg_monthly_outflow_cents)`. Sums are
/// floor-divided by the number of months actually selected, so remainder
/// cents are dropped. When fewer months exist than requested, all of them
/// are used; the window is never padded with zero months.
///
/// Empty aggregates yield `(0, 0)`.
pub fn compute_burn_rate(aggregates: &MonthlyAggregates, lookback_months: u32) -> Result<(i64, i64)> {
    if lookback_months == 0 {
        return Err(EngineError::invalid("lookback_months", "must be at least 1"));
    }
    for flow in aggregates.values() {
        ensure_non_negative("inflow_cents", flow.inflow_cents)?;
        ensure_non_negative("outflow_cents", flow.outflow_cents)?;
    }

    if aggregates.is_empty() {
        return Ok((0, 0));
    }

    if aggregates.len() < lookback_months as usize {
        log::warn!(
            "Lookback of {} months exceeds available history ({} months); averaging all",
            lookback_months,
            aggregates.len()
        );
    }

    let window: Vec<_> = aggregates.values().rev().take(lookback_months as usize).collect();
    let count = window.len() as i64;

    let mut total_inflow: i64 = 0;
    let mut total_outflow: i64 = 0;
    for flow in &window {
        total_inflow = total_inflow
            .checked_add(flow.inflow_cents)
            .ok_or(EngineError::Overflow("total inflow"))?;
        total_outflow = total_outflow
            .checked_add(flow.outflow_cents)
            .ok_or(EngineError::Overflow("total outflow"))?;
    }

    Ok((total_inflow / count, total_outflow / count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::aggregates_from_pairs;

    #[test]
    fn test_basic_burn_rate() {
        let data = aggregates_from_pairs([
            ("2026-01", (200_000_00, 280_000_00)),
            ("2025-12", (190_000_00, 270_000_00)),
            ("2025-11", (185_000_00, 265_000_00)),
        ])
        .unwrap();

        let (inflow, outflow) = compute_burn_rate(&data, 3).unwrap();
        // (200K + 190K + 185K) / 3, remainder cents dropped
        assert_eq!(inflow, 191_666_66);
        assert_eq!(outflow, 271_666_66);
    }

    #[test]
    fn test_empty_data() {
        let data = MonthlyAggregates::new();
        assert_eq!(compute_burn_rate(&data, DEFAULT_LOOKBACK_MONTHS).unwrap(), (0, 0));
    }

    #[test]
    fn test_lookback_limits() {
        let data = aggregates_from_pairs([
            ("2026-01", (100_00, 200_00)),
            ("2025-12", (300_00, 400_00)),
            ("2025-11", (500_00, 600_00)),
        ])
        .unwrap();

        // Only Jan + Dec are in the window
        let (inflow, outflow) = compute_burn_rate(&data, 2).unwrap();
        assert_eq!(inflow, 200_00);
        assert_eq!(outflow, 300_00);
    }

    #[test]
    fn test_lookback_beyond_history_uses_all_months() {
        let data = aggregates_from_pairs([
            ("2025-12", (300_00, 400_00)),
            ("2026-01", (100_00, 200_00)),
        ])
        .unwrap();

        // Divided by 2, not 6
        let (inflow, outflow) = compute_burn_rate(&data, 6).unwrap();
        assert_eq!(inflow, 200_00);
        assert_eq!(outflow, 300_00);
    }

    #[test]
    fn test_window_spans_year_boundary() {
        let data = aggregates_from_pairs([
            ("2025-02", (999_00, 999_00)),
            ("2024-12", (1, 1)),
            ("2025-01", (1_00, 3_00)),
        ])
        .unwrap();

        let (inflow, outflow) = compute_burn_rate(&data, 2).unwrap();
        assert_eq!(inflow, (999_00 + 1_00) / 2);
        assert_eq!(outflow, (999_00 + 3_00) / 2);
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let data = aggregates_from_pairs([("2026-01", (1, 1))]).unwrap();
        assert!(matches!(
            compute_burn_rate(&data, 0),
            Err(EngineError::InvalidArgument { name: "lookback_months", .. })
        ));
    }

    #[test]
    fn test_negative_outflow_rejected() {
        let data = aggregates_from_pairs([("2026-01", (1_00, -1))]).unwrap();
        assert!(compute_burn_rate(&data, 3).is_err());
    }
}
