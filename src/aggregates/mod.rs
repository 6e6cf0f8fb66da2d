//! Monthly aggregates supplied by the upstream aggregation layer

mod data;
pub mod loader;

pub use data::{aggregates_from_pairs, MonthKey, MonthlyAggregates, MonthlyFlow};
pub use loader::{
    load_actions, load_actions_from_reader, load_aggregates, load_aggregates_from_reader,
    load_cash_positions, load_cash_positions_from_reader,
    load_portfolio, load_portfolio_from_reader,
};
