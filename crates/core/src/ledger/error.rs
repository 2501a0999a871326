//! GL validation errors.

use remvio_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when validating a set of GL entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A posting needs at least one entry.
    #[error("A GL posting requires at least one entry")]
    NoEntries,

    /// Entry amounts must be strictly positive.
    #[error("Entry amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Debits and credits do not match.
    #[error("Unbalanced entries: debits {debit}, credits {credit}")]
    Unbalanced {
        /// Sum of debit entries.
        debit: Decimal,
        /// Sum of credit entries.
        credit: Decimal,
    },
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unbalanced { debit, credit } => {
                Self::UnbalancedEntries { debit, credit }
            }
            other => Self::Validation(other.to_string()),
        }
    }
}
