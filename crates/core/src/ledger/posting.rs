//! Balanced-set validation and running-balance arithmetic.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntrySide, EntryTotals, GlEntryInput};

/// Validates a set of entries for posting.
///
/// Requires at least one entry, strictly positive amounts, and
/// sum(debits) == sum(credits) exactly (all entries share the posting's
/// currency; cross-currency postings are not a thing in this engine).
///
/// # Errors
///
/// - [`LedgerError::NoEntries`] for an empty set
/// - [`LedgerError::NonPositiveAmount`] for a zero or negative amount
/// - [`LedgerError::Unbalanced`] when the sums differ
pub fn validate_entries(entries: &[GlEntryInput]) -> Result<EntryTotals, LedgerError> {
    if entries.is_empty() {
        return Err(LedgerError::NoEntries);
    }

    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;

    for entry in entries {
        if entry.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(entry.amount));
        }
        match entry.side {
            EntrySide::Debit => debit += entry.amount,
            EntrySide::Credit => credit += entry.amount,
        }
    }

    let totals = EntryTotals { debit, credit };
    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced { debit, credit });
    }

    Ok(totals)
}

/// Signed delta an entry applies to its account's running balance:
/// `+amount` for a debit, `-amount` for a credit.
#[must_use]
pub fn signed_delta(side: EntrySide, amount: Decimal) -> Decimal {
    match side {
        EntrySide::Debit => amount,
        EntrySide::Credit => -amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn entry(side: EntrySide, amount: Decimal) -> GlEntryInput {
        GlEntryInput::new(Uuid::new_v4(), side, amount)
    }

    #[test]
    fn test_balanced_pair_accepted() {
        let entries = vec![
            entry(EntrySide::Debit, dec!(150)),
            entry(EntrySide::Credit, dec!(150)),
        ];
        let totals = validate_entries(&entries).unwrap();
        assert_eq!(totals.debit, dec!(150));
        assert_eq!(totals.credit, dec!(150));
    }

    #[test]
    fn test_multi_leg_balanced_accepted() {
        // One debit covered by several credits, like a till draw against
        // float payable plus charge revenue.
        let entries = vec![
            entry(EntrySide::Debit, dec!(1022)),
            entry(EntrySide::Credit, dec!(1000)),
            entry(EntrySide::Credit, dec!(20)),
            entry(EntrySide::Credit, dec!(2)),
        ];
        assert!(validate_entries(&entries).is_ok());
    }

    #[test]
    fn test_unbalanced_rejected() {
        let entries = vec![
            entry(EntrySide::Debit, dec!(100)),
            entry(EntrySide::Credit, dec!(90)),
        ];
        assert!(matches!(
            validate_entries(&entries),
            Err(LedgerError::Unbalanced { debit, credit })
                if debit == dec!(100) && credit == dec!(90)
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(validate_entries(&[]), Err(LedgerError::NoEntries)));
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let entries = vec![
            entry(EntrySide::Debit, dec!(0)),
            entry(EntrySide::Credit, dec!(0)),
        ];
        assert!(matches!(
            validate_entries(&entries),
            Err(LedgerError::NonPositiveAmount(_))
        ));

        let entries = vec![
            entry(EntrySide::Debit, dec!(-10)),
            entry(EntrySide::Credit, dec!(-10)),
        ];
        assert!(matches!(
            validate_entries(&entries),
            Err(LedgerError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(EntrySide::Debit, dec!(25)), dec!(25));
        assert_eq!(signed_delta(EntrySide::Credit, dec!(25)), dec!(-25));
    }
}
