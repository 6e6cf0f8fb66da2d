//! Load monthly aggregates and optimization actions from files
//!
//! Aggregate CSV columns: `month,inflow_cents,outflow_cents`.
//! Portfolio CSV columns: `tenant,month,inflow_cents,outflow_cents`.

use super::{MonthKey, MonthlyAggregates, MonthlyFlow};
use crate::engine::OptimizationAction;
use crate::error::{ensure_non_negative, EngineError, Result};
use csv::Reader;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Raw CSV row for a single tenant's aggregates
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    month: String,
    inflow_cents: i64,
    outflow_cents: i64,
}

/// Raw CSV row for a multi-tenant export
#[derive(Debug, serde::Deserialize)]
struct TenantCsvRow {
    tenant: String,
    month: String,
    inflow_cents: i64,
    outflow_cents: i64,
}

fn insert_month(
    aggregates: &mut MonthlyAggregates,
    scope: &str,
    month: &str,
    inflow_cents: i64,
    outflow_cents: i64,
) -> Result<()> {
    let key: MonthKey = month.parse()?;
    ensure_non_negative("inflow_cents", inflow_cents)?;
    ensure_non_negative("outflow_cents", outflow_cents)?;

    if aggregates
        .insert(key, MonthlyFlow::new(inflow_cents, outflow_cents))
        .is_some()
    {
        return Err(EngineError::DuplicateMonth {
            scope: scope.to_string(),
            month: key.to_string(),
        });
    }
    Ok(())
}

/// Load one tenant's aggregates from a CSV file
pub fn load_aggregates<P: AsRef<Path>>(path: P) -> Result<MonthlyAggregates> {
    let file = File::open(path.as_ref())?;
    load_aggregates_from_reader(file)
}

/// Load one tenant's aggregates from any reader (e.g., string buffer, request body)
pub fn load_aggregates_from_reader<R: Read>(reader: R) -> Result<MonthlyAggregates> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut aggregates = MonthlyAggregates::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        insert_month(&mut aggregates, "aggregates", &row.month, row.inflow_cents, row.outflow_cents)?;
    }

    log::debug!("Loaded {} months of aggregates", aggregates.len());
    Ok(aggregates)
}

/// Load aggregates for many tenants from a CSV file
pub fn load_portfolio<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, MonthlyAggregates>> {
    let file = File::open(path.as_ref())?;
    load_portfolio_from_reader(file)
}

/// Load aggregates for many tenants from any reader, keyed by tenant
pub fn load_portfolio_from_reader<R: Read>(
    reader: R,
) -> Result<BTreeMap<String, MonthlyAggregates>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut tenants: BTreeMap<String, MonthlyAggregates> = BTreeMap::new();

    for result in csv_reader.deserialize() {
        let row: TenantCsvRow = result?;
        let aggregates = tenants.entry(row.tenant.clone()).or_default();
        insert_month(aggregates, &row.tenant, &row.month, row.inflow_cents, row.outflow_cents)?;
    }

    log::debug!("Loaded aggregates for {} tenants", tenants.len());
    Ok(tenants)
}

/// Raw CSV row for per-tenant cash positions
#[derive(Debug, serde::Deserialize)]
struct CashCsvRow {
    tenant: String,
    cash_position_cents: i64,
}

/// Load per-tenant cash positions (`tenant,cash_position_cents`) from a CSV file
pub fn load_cash_positions<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, i64>> {
    let file = File::open(path.as_ref())?;
    load_cash_positions_from_reader(file)
}

pub fn load_cash_positions_from_reader<R: Read>(reader: R) -> Result<BTreeMap<String, i64>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut positions = BTreeMap::new();

    for result in csv_reader.deserialize() {
        let row: CashCsvRow = result?;
        if positions.insert(row.tenant.clone(), row.cash_position_cents).is_some() {
            return Err(EngineError::invalid(
                "tenant",
                format!("duplicate cash position for '{}'", row.tenant),
            ));
        }
    }

    Ok(positions)
}

/// Load proposed optimization actions from a JSON array file
pub fn load_actions<P: AsRef<Path>>(path: P) -> Result<Vec<OptimizationAction>> {
    let file = File::open(path.as_ref())?;
    load_actions_from_reader(file)
}

pub fn load_actions_from_reader<R: Read>(reader: R) -> Result<Vec<OptimizationAction>> {
    let actions: Vec<OptimizationAction> = serde_json::from_reader(reader)?;
    for action in &actions {
        action.validate()?;
    }
    Ok(actions)
}
