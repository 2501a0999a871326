//! Lifecycle transition errors.

use remvio_shared::AppError;
use thiserror::Error;

use super::transitions::TransferAction;
use super::types::{Direction, RemittanceStatus, TransferStatus};

/// Errors raised by the transfer state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The action is not legal from the current status.
    #[error("{action} is not allowed for an {direction} transfer in status {from}")]
    IllegalTransition {
        /// Transfer direction.
        direction: Direction,
        /// Attempted action.
        action: TransferAction,
        /// Status the transfer was in.
        from: TransferStatus,
    },

    /// The action requires the remittance track to still be PENDING.
    #[error("Remittance status must be PENDING for this action, found {current}")]
    RemittanceNotPending {
        /// Remittance status the transfer was in.
        current: RemittanceStatus,
    },
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        Self::BusinessRule(err.to_string())
    }
}
