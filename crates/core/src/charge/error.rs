//! Charge calculation errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use remvio_shared::AppError;

/// Errors raised by the charge cascade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChargeError {
    /// Origin amount must be strictly positive.
    #[error("Origin amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Commission share percentages must sum to 100.
    #[error("Share percentages for charge {charge_id} sum to {total}, expected 100")]
    SharesNotHundred {
        /// Offending charge definition.
        charge_id: Uuid,
        /// Actual sum of the three percentages.
        total: Decimal,
    },

    /// A negative rate or flat value is invalid configuration.
    #[error("Charge {charge_id} has a negative rate")]
    NegativeRate {
        /// Offending charge definition.
        charge_id: Uuid,
    },
}

impl From<ChargeError> for AppError {
    fn from(err: ChargeError) -> Self {
        Self::Validation(err.to_string())
    }
}
