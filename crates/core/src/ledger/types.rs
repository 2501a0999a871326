//! GL domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of a double-entry posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntrySide {
    /// The opposite side, used when reversing a posting.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// GL account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlAccountType {
    /// Asset account.
    Asset,
    /// Liability account.
    Liability,
    /// Equity account.
    Equity,
    /// Revenue account.
    Revenue,
    /// Expense account.
    Expense,
}

/// The kind of business entity a GL account can be bound to.
///
/// Bindings let the lifecycle engine resolve accounts without hard-coding
/// ids: "the cash account of till X", "the payable account of float Y",
/// "the revenue account of charge Z".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlEntityKind {
    /// A custody account (bank account, vault, or till).
    CustodyAccount,
    /// An organisation float balance.
    OrgBalance,
    /// A charge definition.
    Charge,
}

/// One entry of a GL posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlEntryInput {
    /// The GL account to post to.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: EntrySide,
    /// Entry amount (must be positive).
    pub amount: Decimal,
    /// Optional memo for this entry.
    pub memo: Option<String>,
}

impl GlEntryInput {
    /// Creates an entry without a memo.
    #[must_use]
    pub const fn new(account_id: Uuid, side: EntrySide, amount: Decimal) -> Self {
        Self {
            account_id,
            side,
            amount,
            memo: None,
        }
    }
}

/// Totals of a validated entry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    /// Sum of debit entries.
    pub debit: Decimal,
    /// Sum of credit entries.
    pub credit: Decimal,
}

impl EntryTotals {
    /// Whether debits equal credits exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_side_flipped() {
        assert_eq!(EntrySide::Debit.flipped(), EntrySide::Credit);
        assert_eq!(EntrySide::Credit.flipped(), EntrySide::Debit);
    }

    #[test]
    fn test_totals_balanced() {
        let totals = EntryTotals {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(10000, 2),
        };
        assert!(totals.is_balanced());

        let unbalanced = EntryTotals {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(9999, 2),
        };
        assert!(!unbalanced.is_balanced());
    }
}
