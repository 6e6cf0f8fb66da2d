//! Error types for the cash-flow engine
//!
//! Normal financial states (no data, zero revenue, profitable company) are
//! never errors. Only caller bugs and I/O failures surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A precondition on an argument was violated by the caller
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },

    #[error("Invalid month key '{0}' (expected YYYY-MM)")]
    InvalidMonthKey(String),

    #[error("Duplicate month {month} for '{scope}'")]
    DuplicateMonth { scope: String, month: String },

    /// Integer cents arithmetic left the representable range
    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject negative cents where the domain only allows non-negative amounts
pub(crate) fn ensure_non_negative(name: &'static str, cents: i64) -> Result<()> {
    if cents < 0 {
        return Err(EngineError::invalid(
            name,
            format!("must be non-negative cents, got {}", cents),
        ));
    }
    Ok(())
}
