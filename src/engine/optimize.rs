//! Runway after proposed cost-cutting and collection actions

use super::runway::{compute_runway, round_to_tenth, BurnAnalysis};
use crate::error::{ensure_non_negative, EngineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Kind of optimization being proposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionCategory {
    InvoiceCollection,
    SubscriptionCut,
    ExpenseReduction,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::InvoiceCollection => "invoice-collection",
            ActionCategory::SubscriptionCut => "subscription-cut",
            ActionCategory::ExpenseReduction => "expense-reduction",
        }
    }
}

/// A proposed action supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationAction {
    pub description: String,

    /// Recurring reduction to monthly burn
    pub monthly_savings_cents: i64,

    /// One-time cash injection (e.g., collected receivables)
    pub one_time_recovery_cents: i64,

    pub category: ActionCategory,
}

impl OptimizationAction {
    pub fn new(
        description: impl Into<String>,
        monthly_savings_cents: i64,
        one_time_recovery_cents: i64,
        category: ActionCategory,
    ) -> Self {
        Self {
            description: description.into(),
            monthly_savings_cents,
            one_time_recovery_cents,
            category,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("monthly_savings_cents", self.monthly_savings_cents)?;
        ensure_non_negative("one_time_recovery_cents", self.one_time_recovery_cents)
    }
}

/// Original runway alongside the runway with all actions applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRunway {
    pub original: BurnAnalysis,

    /// Net burn after savings, floored at zero
    pub optimized_burn_cents: i64,
    pub optimized_runway_months: f64,
    pub optimized_cash_out_date: NaiveDate,

    pub total_monthly_savings_cents: i64,
    pub total_one_time_recovery_cents: i64,

    /// Actions applied, in caller order
    pub actions: Vec<OptimizationAction>,
}

fn sum_actions(actions: &[OptimizationAction]) -> Result<(i64, i64)> {
    let mut savings: i64 = 0;
    let mut recovery: i64 = 0;
    for action in actions {
        action.validate()?;
        savings = savings
            .checked_add(action.monthly_savings_cents)
            .ok_or(EngineError::Overflow("total monthly savings"))?;
        recovery = recovery
            .checked_add(action.one_time_recovery_cents)
            .ok_or(EngineError::Overflow("total one-time recovery"))?;
    }
    Ok((savings, recovery))
}

/// Recompute runway with every action applied at once
///
/// Savings are subtracted from gross burn without clamping; if they exceed
/// burn the nested runway computation lands on the infinite sentinel.
/// An empty action list reproduces the original runway and cash-out date.
pub fn compute_optimized_runway(
    burn: &BurnAnalysis,
    cash_position_cents: i64,
    actions: &[OptimizationAction],
    reference_date: NaiveDate,
) -> Result<OptimizedRunway> {
    let (total_monthly_savings, total_one_time) = sum_actions(actions)?;

    let optimized_burn = burn
        .monthly_burn_cents
        .checked_sub(total_monthly_savings)
        .ok_or(EngineError::Overflow("optimized burn"))?;
    let optimized_cash = cash_position_cents
        .checked_add(total_one_time)
        .ok_or(EngineError::Overflow("optimized cash"))?;

    let optimized = compute_runway(
        optimized_cash,
        optimized_burn,
        burn.monthly_revenue_cents,
        reference_date,
    )?;

    log::debug!(
        "Applied {} actions: runway {} -> {} months",
        actions.len(),
        burn.runway_months,
        optimized.runway_months
    );

    Ok(OptimizedRunway {
        original: burn.clone(),
        optimized_burn_cents: optimized.net_burn_cents,
        optimized_runway_months: optimized.runway_months,
        optimized_cash_out_date: optimized.cash_out_date,
        total_monthly_savings_cents: total_monthly_savings,
        total_one_time_recovery_cents: total_one_time,
        actions: actions.to_vec(),
    })
}

/// Runway effect of a single action applied on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionImpact {
    pub action: OptimizationAction,

    /// Runway with only this action applied (999.0 when it reaches break-even)
    pub runway_months: f64,

    /// Change in displayed runway; `None` when either side is unbounded
    pub delta_runway_months: Option<f64>,

    /// The action alone stops net burn; false when burn was already zero
    pub reaches_break_even: bool,
}

/// Evaluate each action in isolation, biggest runway gain first
///
/// Actions that reach break-even sort ahead of all finite gains. Ties keep
/// caller order.
pub fn rank_actions(
    burn: &BurnAnalysis,
    cash_position_cents: i64,
    actions: &[OptimizationAction],
    reference_date: NaiveDate,
) -> Result<Vec<ActionImpact>> {
    let mut impacts = Vec::with_capacity(actions.len());

    for action in actions {
        let single = compute_optimized_runway(
            burn,
            cash_position_cents,
            std::slice::from_ref(action),
            reference_date,
        )?;
        let reaches_break_even = !burn.is_infinite() && single.optimized_burn_cents == 0;
        let delta_runway_months = if reaches_break_even || burn.is_infinite() {
            None
        } else {
            Some(round_to_tenth(single.optimized_runway_months - burn.runway_months))
        };

        impacts.push(ActionImpact {
            action: action.clone(),
            runway_months: single.optimized_runway_months,
            delta_runway_months,
            reaches_break_even,
        });
    }

    impacts.sort_by(|a, b| match (a.reaches_break_even, b.reaches_break_even) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b
            .delta_runway_months
            .unwrap_or(0.0)
            .total_cmp(&a.delta_runway_months.unwrap_or(0.0)),
    });

    Ok(impacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn feb_1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    fn demo_burn() -> BurnAnalysis {
        compute_runway(500_000_00, 287_000_00, 189_000_00, feb_1()).unwrap()
    }

    fn demo_actions() -> Vec<OptimizationAction> {
        vec![
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
        ]
    }

    #[test]
    fn test_optimization_extends_runway() {
        let burn = demo_burn();
        let actions = demo_actions();

        let result = compute_optimized_runway(&burn, 500_000_00, &actions, feb_1()).unwrap();

        assert!(result.optimized_runway_months > burn.runway_months);
        assert!(result.optimized_cash_out_date > burn.cash_out_date);
        assert_eq!(result.total_monthly_savings_cents, 2_800_00);
        assert_eq!(result.total_one_time_recovery_cents, 94_000_00);
        assert_eq!(result.optimized_burn_cents, 95_200_00);
        assert_eq!(result.actions, actions);
        assert_eq!(result.original, burn);
    }

    #[test]
    fn test_empty_actions_is_noop() {
        let burn = demo_burn();
        let result = compute_optimized_runway(&burn, 500_000_00, &[], feb_1()).unwrap();

        assert_eq!(result.optimized_runway_months, burn.runway_months);
        assert_eq!(result.optimized_cash_out_date, burn.cash_out_date);
        assert_eq!(result.optimized_burn_cents, burn.net_burn_cents);
        assert_eq!(result.total_monthly_savings_cents, 0);
        assert_eq!(result.total_one_time_recovery_cents, 0);
        assert!(result.actions.is_empty());
    }

    #[test]
    fn test_savings_beyond_burn_reach_sentinel() {
        let burn = compute_runway(100_000_00, 150_000_00, 100_000_00, feb_1()).unwrap();
        let actions = vec![OptimizationAction::new(
            "Close the office",
            200_000_00,
            0,
            ActionCategory::ExpenseReduction,
        )];

        let result = compute_optimized_runway(&burn, 100_000_00, &actions, feb_1()).unwrap();

        // Raw optimized burn is -50K; the stored value is the clamped net burn
        assert_eq!(result.optimized_burn_cents, 0);
        assert_eq!(result.optimized_runway_months, 999.0);
        assert_eq!(result.optimized_cash_out_date, feb_1() + chrono::Days::new(36_500));
    }

    #[test]
    fn test_action_order_preserved() {
        let burn = demo_burn();
        let mut actions = demo_actions();
        actions.reverse();

        let result = compute_optimized_runway(&burn, 500_000_00, &actions, feb_1()).unwrap();
        assert_eq!(result.actions[0].description, "Cancel unused SaaS");
        assert_eq!(result.actions[1].description, "Collect overdue invoices");
    }

    #[test]
    fn test_negative_action_rejected() {
        let burn = demo_burn();
        let actions = vec![OptimizationAction::new(
            "Bad data",
            -1,
            0,
            ActionCategory::ExpenseReduction,
        )];
        assert!(compute_optimized_runway(&burn, 500_000_00, &actions, feb_1()).is_err());
    }

    #[test]
    fn test_rank_actions_by_impact() {
        let burn = demo_burn();
        let mut actions = demo_actions();
        actions.push(OptimizationAction::new(
            "Drop the second office",
            98_000_00,
            0,
            ActionCategory::ExpenseReduction,
        ));

        let ranked = rank_actions(&burn, 500_000_00, &actions, feb_1()).unwrap();
        assert_eq!(ranked.len(), 3);

        // Break-even first
        assert_eq!(ranked[0].action.description, "Drop the second office");
        assert!(ranked[0].reaches_break_even);
        assert_eq!(ranked[0].delta_runway_months, None);

        // 594K / 98K = 6.1 vs 5.1
        assert_eq!(ranked[1].action.description, "Collect overdue invoices");
        assert_abs_diff_eq!(ranked[1].delta_runway_months.unwrap(), 1.0, epsilon = 1e-9);

        // 500K / 95.2K = 5.3 vs 5.1
        assert_eq!(ranked[2].action.description, "Cancel unused SaaS");
        assert_abs_diff_eq!(ranked[2].delta_runway_months.unwrap(), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_rank_actions_when_not_burning() {
        let burn = compute_runway(500_000_00, 200_000_00, 300_000_00, feb_1()).unwrap();
        let actions = vec![OptimizationAction::new(
            "Collect overdue invoices",
            0,
            94_000_00,
            ActionCategory::InvoiceCollection,
        )];

        let ranked = rank_actions(&burn, 500_000_00, &actions, feb_1()).unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(!ranked[0].reaches_break_even);
        assert_eq!(ranked[0].delta_runway_months, None);
        assert_eq!(ranked[0].runway_months, 999.0);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&ActionCategory::SubscriptionCut).unwrap();
        assert_eq!(json, "\"subscription-cut\"");
        assert_eq!(ActionCategory::InvoiceCollection.as_str(), "invoice-collection");
    }
}
