//! Structured error model shared by every engine.
//!
//! Engines never swallow a settlement failure: an `Err` always means the
//! transaction it occurred in was rolled back, and the caller sees the
//! specific reason rather than a generic failure.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type MarketResult<T> = Result<T, MarketError>;

/// A structured, classifiable error.
///
/// Each variant corresponds to one of the error kinds in the design
/// document: callers (an HTTP layer, the CLI, the simulator's retry loop)
/// match on the kind rather than parsing message text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarketError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    StateInvalid(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("duplicate booking: {0}")]
    DuplicateBooking(String),

    #[error("overlapping booking: {0}")]
    OverlapBooking(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// True for the settlement-rejection family (capacity/duplicate/overlap/quota)
    /// that the auction engine must roll an in-flight bid back on.
    pub fn is_settlement_rejection(&self) -> bool {
        matches!(
            self,
            MarketError::CapacityExceeded(_)
                | MarketError::DuplicateBooking(_)
                | MarketError::OverlapBooking(_)
                | MarketError::QuotaExceeded(_)
        )
    }

    /// True for transient errors the simulator's automatic-bid loop may retry
    /// locally (at most 3 attempts per the design document).
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketError::Conflict(_))
    }
}
