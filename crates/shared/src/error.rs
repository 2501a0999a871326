//! Application-wide error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Available balance or float is short.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Balance available to the operation.
        available: Decimal,
        /// Amount the operation asked for.
        requested: Decimal,
    },

    /// General-ledger debits and credits do not match.
    #[error("Unbalanced entries: debits {debit}, credits {credit}")]
    UnbalancedEntries {
        /// Sum of debit entries.
        debit: Decimal,
        /// Sum of credit entries.
        credit: Decimal,
    },

    /// Conflict (e.g., concurrent modification, duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::UnbalancedEntries { .. } => "UNBALANCED_ENTRIES",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the error is a caller mistake rather than a fault of
    /// the system (useful for deciding log level and retryability).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::BusinessRule(String::new()).error_code(),
            "BUSINESS_RULE_VIOLATION"
        );
        assert_eq!(
            AppError::InsufficientFunds {
                available: dec!(1),
                requested: dec!(2)
            }
            .error_code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            AppError::UnbalancedEntries {
                debit: dec!(1),
                credit: dec!(2)
            }
            .error_code(),
            "UNBALANCED_ENTRIES"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("corridor".into()).to_string(),
            "Not found: corridor"
        );
        assert_eq!(
            AppError::InsufficientFunds {
                available: dec!(400),
                requested: dec!(500)
            }
            .to_string(),
            "Insufficient funds: available 400, requested 500"
        );
        assert_eq!(
            AppError::UnbalancedEntries {
                debit: dec!(100),
                credit: dec!(90)
            }
            .to_string(),
            "Unbalanced entries: debits 100, credits 90"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::NotFound(String::new()).is_client_error());
        assert!(AppError::BusinessRule(String::new()).is_client_error());
        assert!(AppError::Conflict(String::new()).is_client_error());
        assert!(!AppError::Database(String::new()).is_client_error());
        assert!(!AppError::Internal(String::new()).is_client_error());
    }
}
