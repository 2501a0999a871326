//! Double-entry general ledger logic.
//!
//! This module implements the pure side of GL posting:
//! - Entry inputs (debits and credits) and account typing
//! - Balanced-set validation (sum of debits == sum of credits)
//! - Signed running-balance deltas
//! - Reversal arithmetic (flip sides, preserve amounts)

pub mod error;
pub mod posting;
pub mod reversal;
pub mod types;

pub use error::LedgerError;
pub use posting::{signed_delta, validate_entries};
pub use reversal::reversing_entries;
pub use types::{EntrySide, EntryTotals, GlAccountType, GlEntityKind, GlEntryInput};
