//! Reversal arithmetic for posted GL transactions.
//!
//! Reversal is additive: history is never edited, only offset by a new
//! posting whose entries are the originals with debit and credit swapped.

use super::types::GlEntryInput;

/// Builds the reversing entry set for a posted transaction.
///
/// Each entry keeps its account and amount; the side is flipped and the memo
/// is prefixed so the offset is recognisable in the journal.
#[must_use]
pub fn reversing_entries(original: &[GlEntryInput]) -> Vec<GlEntryInput> {
    original
        .iter()
        .map(|entry| GlEntryInput {
            account_id: entry.account_id,
            side: entry.side.flipped(),
            amount: entry.amount,
            memo: Some(format!(
                "Reversal: {}",
                entry.memo.clone().unwrap_or_default()
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::posting::validate_entries;
    use crate::ledger::types::EntrySide;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn approval_posting() -> Vec<GlEntryInput> {
        vec![
            GlEntryInput {
                account_id: Uuid::new_v4(),
                side: EntrySide::Debit,
                amount: dec!(1022),
                memo: Some("Till cash".to_string()),
            },
            GlEntryInput {
                account_id: Uuid::new_v4(),
                side: EntrySide::Credit,
                amount: dec!(1000),
                memo: Some("Float payable".to_string()),
            },
            GlEntryInput {
                account_id: Uuid::new_v4(),
                side: EntrySide::Credit,
                amount: dec!(22),
                memo: None,
            },
        ]
    }

    #[test]
    fn test_sides_flipped_amounts_preserved() {
        let original = approval_posting();
        let reversed = reversing_entries(&original);

        assert_eq!(reversed.len(), original.len());
        for (orig, rev) in original.iter().zip(&reversed) {
            assert_eq!(rev.account_id, orig.account_id);
            assert_eq!(rev.amount, orig.amount);
            assert_eq!(rev.side, orig.side.flipped());
        }
    }

    #[test]
    fn test_reversal_of_balanced_set_is_balanced() {
        let original = approval_posting();
        assert!(validate_entries(&original).is_ok());
        assert!(validate_entries(&reversing_entries(&original)).is_ok());
    }

    #[test]
    fn test_memo_prefixed() {
        let reversed = reversing_entries(&approval_posting());
        assert_eq!(reversed[0].memo.as_deref(), Some("Reversal: Till cash"));
        assert_eq!(reversed[2].memo.as_deref(), Some("Reversal: "));
    }

    #[test]
    fn test_double_reversal_restores_sides() {
        let original = approval_posting();
        let twice = reversing_entries(&reversing_entries(&original));
        for (orig, back) in original.iter().zip(&twice) {
            assert_eq!(back.side, orig.side);
            assert_eq!(back.amount, orig.amount);
        }
    }
}
