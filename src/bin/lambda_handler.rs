//! AWS Lambda handler for dashboard snapshots
//!
//! Accepts one tenant's aggregates, cash position and proposed actions as
//! JSON and returns the full snapshot. The reference date comes from the
//! request or, failing that, the invocation clock.

use cashflow_engine::snapshot::{build_snapshot, FinancialSnapshot, SnapshotConfig, SnapshotInputs};
use chrono::{NaiveDate, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

/// Input payload for a snapshot
#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    #[serde(flatten)]
    pub inputs: SnapshotInputs,

    /// Overrides for lookback, horizon, growth and DSO period
    #[serde(default)]
    pub config: SnapshotConfig,

    /// Reference date (default: today, UTC)
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Output from the handler
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<FinancialSnapshot>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn handler(event: LambdaEvent<SnapshotRequest>) -> Result<SnapshotResponse, Error> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();
    let reference_date = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    // Invalid input is reported in the body rather than failing the invocation
    let (snapshot, error) = match build_snapshot(&request.inputs, &request.config, reference_date) {
        Ok(snapshot) => (Some(snapshot), None),
        Err(e) => {
            log::warn!("Rejected snapshot request: {}", e);
            (None, Some(e.to_string()))
        }
    };

    Ok(SnapshotResponse {
        snapshot,
        execution_time_ms: start.elapsed().as_millis() as u64,
        error,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
