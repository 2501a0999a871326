//! Organisation float balance rules and periodic snapshots.
//!
//! A partner organisation holds a prepaid float against the platform. The
//! pure side of that ledger lives here: available-balance arithmetic, the
//! lock/unlock invariants, and the monthly period bookkeeping (accumulators,
//! closing arithmetic, and the close-window guard).

pub mod error;
pub mod rules;
pub mod types;

pub use error::FloatError;
pub use rules::{clamp_unlock, close_window_open, validate_lock, validate_withdraw};
pub use types::{AccumulatorKind, FloatBalance, PeriodActivity, PeriodKey};
