//! Shared domain types used across crates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity performing an operation, attached to audit and history rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user, if any (None for system jobs).
    pub user_id: Option<Uuid>,
    /// The originating IP address, supplied by the request layer.
    pub ip: Option<String>,
}

impl Actor {
    /// An actor for a request made by a user.
    #[must_use]
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ip: None,
        }
    }

    /// An actor for a request made by a user from a known address.
    #[must_use]
    pub fn user_from(user_id: Uuid, ip: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            ip: Some(ip.into()),
        }
    }

    /// The system actor, used by batch jobs.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            user_id: None,
            ip: None,
        }
    }
}

/// The kind of balance mutation, recorded on every history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceAction {
    /// Float funding by a partner organisation.
    Deposit,
    /// Float withdrawal by a partner organisation.
    Withdraw,
    /// Reservation of available float against an approved transfer.
    Lock,
    /// Release of a previous reservation.
    Unlock,
    /// Direct adjustment of a float balance on settlement.
    Settle,
    /// Cash received into a custody account.
    CashIn,
    /// Cash paid out of a custody account.
    CashOut,
    /// Balance rewrite performed by a period close.
    PeriodClose,
}

impl BalanceAction {
    /// Stable string form stored in the history table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
            Self::Lock => "LOCK",
            Self::Unlock => "UNLOCK",
            Self::Settle => "SETTLE",
            Self::CashIn => "CASH_IN",
            Self::CashOut => "CASH_OUT",
            Self::PeriodClose => "PERIOD_CLOSE",
        }
    }
}

/// Structured result of a balance mutation.
///
/// Every custody or float operation returns one of these so callers can
/// observe exactly what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    /// Balance before the mutation.
    pub old_balance: Decimal,
    /// Balance after the mutation.
    pub new_balance: Decimal,
    /// Signed change applied.
    pub change_amount: Decimal,
    /// The kind of mutation.
    pub operation: BalanceAction,
}

impl BalanceChange {
    /// Creates a change record from before/after balances.
    #[must_use]
    pub fn new(old_balance: Decimal, new_balance: Decimal, operation: BalanceAction) -> Self {
        Self {
            old_balance,
            new_balance,
            change_amount: new_balance - old_balance,
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_change_signed_amount() {
        let up = BalanceChange::new(dec!(100), dec!(150), BalanceAction::Deposit);
        assert_eq!(up.change_amount, dec!(50));

        let down = BalanceChange::new(dec!(100), dec!(40), BalanceAction::Withdraw);
        assert_eq!(down.change_amount, dec!(-60));
    }

    #[test]
    fn test_balance_action_strings() {
        assert_eq!(BalanceAction::Lock.as_str(), "LOCK");
        assert_eq!(BalanceAction::Unlock.as_str(), "UNLOCK");
        assert_eq!(BalanceAction::PeriodClose.as_str(), "PERIOD_CLOSE");
    }

    #[test]
    fn test_actor_constructors() {
        let system = Actor::system();
        assert!(system.user_id.is_none());
        assert!(system.ip.is_none());

        let id = Uuid::new_v4();
        let user = Actor::user_from(id, "10.0.0.1");
        assert_eq!(user.user_id, Some(id));
        assert_eq!(user.ip.as_deref(), Some("10.0.0.1"));
    }
}
