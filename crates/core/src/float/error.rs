//! Float ledger errors.

use remvio_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by float balance rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FloatError {
    /// Available balance is short of the requested amount.
    #[error("Insufficient available float: available {available}, requested {requested}")]
    InsufficientAvailable {
        /// `balance - locked` at the time of the check.
        available: Decimal,
        /// Amount the operation asked for.
        requested: Decimal,
    },

    /// Lock/withdraw amounts must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

impl From<FloatError> for AppError {
    fn from(err: FloatError) -> Self {
        match err {
            FloatError::InsufficientAvailable {
                available,
                requested,
            } => Self::InsufficientFunds {
                available,
                requested,
            },
            other => Self::Validation(other.to_string()),
        }
    }
}
