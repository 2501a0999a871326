//! The transfer transition table.

use serde::{Deserialize, Serialize};

use super::error::LifecycleError;
use super::types::{Direction, RemittanceStatus, RequestStatus, TransferStatus};

/// Actions the lifecycle engine can attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferAction {
    /// Assign and mark ready for approval.
    MarkReady,
    /// Approve (locks/moves funds).
    Approve,
    /// Edit fields and recompute charges.
    Update,
    /// Cancel before any funds moved.
    Cancel,
    /// Undo an approved transfer.
    Reverse,
    /// Settle the linked outbound once the inbound pays out.
    Complete,
}

impl std::fmt::Display for TransferAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MarkReady => "mark-ready",
            Self::Approve => "approve",
            Self::Update => "update",
            Self::Cancel => "cancel",
            Self::Reverse => "reverse",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Result of a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// New primary status.
    pub status: TransferStatus,
    /// New remittance status, or None when the track is unchanged (the
    /// orchestrator may still advance it, e.g. to TRANSIT once an internal
    /// mirror transfer exists).
    pub remittance: Option<RemittanceStatus>,
    /// New request status.
    pub request: RequestStatus,
}

/// Validates an action against the current state and returns the outcome.
///
/// The primary status drives legality; `remittance` is consulted only where
/// the money position matters (cancel and outbound reverse require that
/// nothing has left yet).
///
/// # Errors
///
/// [`LifecycleError::IllegalTransition`] when the action is not legal from
/// the current status; [`LifecycleError::RemittanceNotPending`] when the
/// status is legal but funds are already in transit or paid.
pub fn apply(
    direction: Direction,
    action: TransferAction,
    status: TransferStatus,
    remittance: RemittanceStatus,
) -> Result<TransitionOutcome, LifecycleError> {
    use TransferStatus as S;

    let illegal = || {
        Err(LifecycleError::IllegalTransition {
            direction,
            action,
            from: status,
        })
    };

    match action {
        TransferAction::MarkReady => match status {
            S::Pending | S::PendingApproval => Ok(TransitionOutcome {
                status: S::Ready,
                remittance: None,
                request: RequestStatus::Ready,
            }),
            _ => illegal(),
        },

        TransferAction::Update => match (direction, status) {
            (Direction::Outbound, S::Pending | S::PendingApproval) => Ok(TransitionOutcome {
                status,
                remittance: None,
                request: RequestStatus::Pending,
            }),
            _ => illegal(),
        },

        TransferAction::Approve => match status {
            S::PendingApproval | S::Ready => Ok(TransitionOutcome {
                status: S::Approved,
                remittance: match direction {
                    // Inbound approval is the payout itself.
                    Direction::Inbound => Some(RemittanceStatus::Paid),
                    Direction::Outbound => None,
                },
                request: RequestStatus::Approved,
            }),
            _ => illegal(),
        },

        TransferAction::Cancel => match status {
            S::Pending | S::PendingApproval | S::Ready => {
                if remittance != RemittanceStatus::Pending {
                    return Err(LifecycleError::RemittanceNotPending {
                        current: remittance,
                    });
                }
                Ok(TransitionOutcome {
                    status: S::Cancelled,
                    remittance: None,
                    request: RequestStatus::Cancelled,
                })
            }
            _ => illegal(),
        },

        TransferAction::Reverse => match (direction, status) {
            (Direction::Outbound, S::Approved) => {
                if remittance != RemittanceStatus::Pending {
                    return Err(LifecycleError::RemittanceNotPending {
                        current: remittance,
                    });
                }
                Ok(TransitionOutcome {
                    status: S::Reversed,
                    remittance: None,
                    request: RequestStatus::Reversed,
                })
            }
            (Direction::Inbound, S::Approved | S::Completed) => Ok(TransitionOutcome {
                status: S::Reversed,
                remittance: None,
                request: RequestStatus::Reversed,
            }),
            _ => illegal(),
        },

        TransferAction::Complete => match (direction, status) {
            (Direction::Outbound, S::Approved) => Ok(TransitionOutcome {
                status: S::Completed,
                remittance: Some(RemittanceStatus::Paid),
                request: RequestStatus::Completed,
            }),
            _ => illegal(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use Direction::{Inbound, Outbound};
    use RemittanceStatus as R;
    use TransferAction as A;
    use TransferStatus as S;

    #[rstest]
    #[case(Outbound, A::MarkReady, S::Pending, R::Pending, S::Ready)]
    #[case(Outbound, A::MarkReady, S::PendingApproval, R::Pending, S::Ready)]
    #[case(Outbound, A::Approve, S::PendingApproval, R::Pending, S::Approved)]
    #[case(Outbound, A::Approve, S::Ready, R::Pending, S::Approved)]
    #[case(Inbound, A::Approve, S::PendingApproval, R::Transit, S::Approved)]
    #[case(Outbound, A::Cancel, S::Pending, R::Pending, S::Cancelled)]
    #[case(Outbound, A::Cancel, S::PendingApproval, R::Pending, S::Cancelled)]
    #[case(Outbound, A::Cancel, S::Ready, R::Pending, S::Cancelled)]
    #[case(Outbound, A::Reverse, S::Approved, R::Pending, S::Reversed)]
    #[case(Inbound, A::Reverse, S::Approved, R::Paid, S::Reversed)]
    #[case(Inbound, A::Reverse, S::Completed, R::Paid, S::Reversed)]
    #[case(Outbound, A::Complete, S::Approved, R::Transit, S::Completed)]
    fn test_legal_transitions(
        #[case] direction: Direction,
        #[case] action: TransferAction,
        #[case] from: TransferStatus,
        #[case] remittance: RemittanceStatus,
        #[case] expected: TransferStatus,
    ) {
        let outcome = apply(direction, action, from, remittance).unwrap();
        assert_eq!(outcome.status, expected);
    }

    #[rstest]
    #[case(Outbound, A::Approve, S::Approved, R::Pending)]
    #[case(Outbound, A::Approve, S::Cancelled, R::Pending)]
    #[case(Outbound, A::Approve, S::Completed, R::Paid)]
    #[case(Outbound, A::Cancel, S::Approved, R::Pending)]
    #[case(Outbound, A::Reverse, S::PendingApproval, R::Pending)]
    #[case(Outbound, A::Reverse, S::Completed, R::Paid)]
    #[case(Inbound, A::Reverse, S::PendingApproval, R::Transit)]
    #[case(Inbound, A::Update, S::PendingApproval, R::Transit)]
    #[case(Inbound, A::Complete, S::Approved, R::Paid)]
    #[case(Outbound, A::MarkReady, S::Ready, R::Pending)]
    fn test_illegal_transitions(
        #[case] direction: Direction,
        #[case] action: TransferAction,
        #[case] from: TransferStatus,
        #[case] remittance: RemittanceStatus,
    ) {
        assert!(matches!(
            apply(direction, action, from, remittance),
            Err(LifecycleError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_requires_pending_remittance() {
        let result = apply(Outbound, A::Cancel, S::Ready, R::Transit);
        assert!(matches!(
            result,
            Err(LifecycleError::RemittanceNotPending { current: R::Transit })
        ));
    }

    #[test]
    fn test_outbound_reverse_requires_pending_remittance() {
        // Once the mirror inbound exists the money is in transit and the
        // outbound can no longer be reversed directly.
        let result = apply(Outbound, A::Reverse, S::Approved, R::Transit);
        assert!(matches!(
            result,
            Err(LifecycleError::RemittanceNotPending { current: R::Transit })
        ));
    }

    #[test]
    fn test_update_keeps_status() {
        let outcome = apply(Outbound, A::Update, S::PendingApproval, R::Pending).unwrap();
        assert_eq!(outcome.status, S::PendingApproval);
    }

    #[test]
    fn test_inbound_approval_pays_out() {
        let outcome = apply(Inbound, A::Approve, S::Ready, R::Transit).unwrap();
        assert_eq!(outcome.remittance, Some(R::Paid));
        assert_eq!(outcome.request, RequestStatus::Approved);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for status in [S::Completed, S::Cancelled, S::Reversed] {
            for action in [A::MarkReady, A::Approve, A::Update, A::Cancel, A::Complete] {
                assert!(
                    apply(Outbound, action, status, R::Pending).is_err(),
                    "{action} from {status} should be illegal"
                );
            }
        }
        // The one exception: an inbound in COMPLETED may still be reversed.
        assert!(apply(Inbound, A::Reverse, S::Completed, R::Paid).is_ok());
        assert!(apply(Outbound, A::Reverse, S::Cancelled, R::Pending).is_err());
    }
}
