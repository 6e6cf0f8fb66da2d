//! Month keys and monthly inflow/outflow totals supplied by the aggregation layer

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A calendar month, ordered chronologically
///
/// Field order matters: the derived `Ord` compares year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(EngineError::InvalidMonthKey(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for MonthKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidMonthKey(s.to_string());
        let trimmed = s.trim();
        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;

        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Gross inflow and outflow for one month, in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    pub inflow_cents: i64,
    pub outflow_cents: i64,
}

impl MonthlyFlow {
    pub fn new(inflow_cents: i64, outflow_cents: i64) -> Self {
        Self {
            inflow_cents,
            outflow_cents,
        }
    }
}

impl From<(i64, i64)> for MonthlyFlow {
    fn from((inflow_cents, outflow_cents): (i64, i64)) -> Self {
        Self::new(inflow_cents, outflow_cents)
    }
}

/// Monthly aggregates for one tenant, iterated oldest month first
pub type MonthlyAggregates = BTreeMap<MonthKey, MonthlyFlow>;

/// Build aggregates from `("YYYY-MM", (inflow, outflow))` pairs
///
/// Duplicate months are rejected rather than silently overwritten.
pub fn aggregates_from_pairs<'a, I>(pairs: I) -> Result<MonthlyAggregates>
where
    I: IntoIterator<Item = (&'a str, (i64, i64))>,
{
    let mut aggregates = MonthlyAggregates::new();
    for (month, flow) in pairs {
        let key: MonthKey = month.parse()?;
        if aggregates.insert(key, flow.into()).is_some() {
            return Err(EngineError::DuplicateMonth {
                scope: "aggregates".to_string(),
                month: key.to_string(),
            });
        }
    }
    Ok(aggregates)
}
