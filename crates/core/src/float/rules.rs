//! Float balance invariants and the period-close window guard.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::FloatError;
use super::types::FloatBalance;

/// A period may only be closed within this many days of its month end.
/// Earlier calls are silent no-ops, a deliberate throttle against premature
/// closes.
pub const CLOSE_WINDOW_DAYS: i64 = 3;

/// Validates that `amount` can be locked on the float.
///
/// Precondition: `balance - locked >= amount`.
///
/// # Errors
///
/// [`FloatError::InsufficientAvailable`] when the available balance is
/// short; [`FloatError::NonPositiveAmount`] for a zero or negative amount.
pub fn validate_lock(float: &FloatBalance, amount: Decimal) -> Result<(), FloatError> {
    if amount <= Decimal::ZERO {
        return Err(FloatError::NonPositiveAmount(amount));
    }
    let available = float.available();
    if available < amount {
        return Err(FloatError::InsufficientAvailable {
            available,
            requested: amount,
        });
    }
    Ok(())
}

/// Computes the new locked balance after an unlock, clamped at zero.
///
/// Unlocking more than is locked indicates a pairing bug upstream; the
/// caller logs it, but the locked balance never goes negative.
///
/// Returns `(new_locked, clamped)`.
#[must_use]
pub fn clamp_unlock(locked: Decimal, amount: Decimal) -> (Decimal, bool) {
    let new_locked = locked - amount;
    if new_locked < Decimal::ZERO {
        (Decimal::ZERO, true)
    } else {
        (new_locked, false)
    }
}

/// Validates that `amount` can be withdrawn from the float balance.
///
/// A withdrawal may not eat into the locked portion: the resulting balance
/// must stay at or above `locked`.
///
/// # Errors
///
/// Same taxonomy as [`validate_lock`].
pub fn validate_withdraw(float: &FloatBalance, amount: Decimal) -> Result<(), FloatError> {
    validate_lock(float, amount)
}

/// Whether a period whose month ends on `period_end` may be closed today.
///
/// True from `CLOSE_WINDOW_DAYS` days before the month end onwards,
/// including any later date (a late close is always allowed).
#[must_use]
pub fn close_window_open(period_end: NaiveDate, today: NaiveDate) -> bool {
    (period_end - today).num_days() <= CLOSE_WINDOW_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn float(balance: Decimal, locked: Decimal) -> FloatBalance {
        FloatBalance {
            balance,
            locked,
            limit: Decimal::ZERO,
        }
    }

    #[test]
    fn test_lock_within_available_succeeds() {
        assert!(validate_lock(&float(dec!(1000), dec!(0)), dec!(150)).is_ok());
        assert!(validate_lock(&float(dec!(1000), dec!(850)), dec!(150)).is_ok());
    }

    #[test]
    fn test_lock_beyond_available_fails() {
        let result = validate_lock(&float(dec!(1000), dec!(900)), dec!(150));
        assert!(matches!(
            result,
            Err(FloatError::InsufficientAvailable { available, requested })
                if available == dec!(100) && requested == dec!(150)
        ));
    }

    #[test]
    fn test_lock_non_positive_rejected() {
        assert!(validate_lock(&float(dec!(1000), dec!(0)), dec!(0)).is_err());
        assert!(validate_lock(&float(dec!(1000), dec!(0)), dec!(-5)).is_err());
    }

    #[test]
    fn test_unlock_clamps_at_zero() {
        assert_eq!(clamp_unlock(dec!(100), dec!(40)), (dec!(60), false));
        assert_eq!(clamp_unlock(dec!(100), dec!(100)), (dec!(0), false));
        assert_eq!(clamp_unlock(dec!(100), dec!(130)), (dec!(0), true));
    }

    #[test]
    fn test_withdraw_cannot_touch_locked_portion() {
        // 1000 total, 400 locked: at most 600 may leave.
        let f = float(dec!(1000), dec!(400));
        assert!(validate_withdraw(&f, dec!(600)).is_ok());
        assert!(validate_withdraw(&f, dec!(601)).is_err());
    }

    #[test]
    fn test_close_window() {
        let month_end = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();

        // 10 days early: shut.
        let early = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        assert!(!close_window_open(month_end, early));

        // Exactly 3 days before: open.
        let edge = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert!(close_window_open(month_end, edge));

        // On the month end and after: open.
        assert!(close_window_open(month_end, month_end));
        let late = NaiveDate::from_ymd_opt(2026, 9, 4).unwrap();
        assert!(close_window_open(month_end, late));
    }
}

/// Property-based tests for the float invariants.
#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A permitted lock never drives `balance - locked` negative.
        #[test]
        fn prop_lock_preserves_available_invariant(
            balance in amount_strategy(),
            locked in amount_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assume!(locked <= balance);
            let float = FloatBalance { balance, locked, limit: Decimal::ZERO };

            if validate_lock(&float, amount).is_ok() {
                let after = FloatBalance {
                    balance,
                    locked: locked + amount,
                    limit: Decimal::ZERO,
                };
                prop_assert!(after.available() >= Decimal::ZERO);
            }
        }

        /// Unlock never produces a negative locked balance.
        #[test]
        fn prop_unlock_never_negative(
            locked in amount_strategy(),
            amount in amount_strategy(),
        ) {
            let (new_locked, _) = clamp_unlock(locked, amount);
            prop_assert!(new_locked >= Decimal::ZERO);
        }

        /// Lock then unlock of the same amount is a no-op on locked.
        #[test]
        fn prop_lock_unlock_pairing_nets_zero(
            balance in amount_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assume!(amount > Decimal::ZERO);
            prop_assume!(amount <= balance);
            let float = FloatBalance { balance, locked: Decimal::ZERO, limit: Decimal::ZERO };

            prop_assert!(validate_lock(&float, amount).is_ok());
            let (after_unlock, clamped) = clamp_unlock(Decimal::ZERO + amount, amount);
            prop_assert_eq!(after_unlock, Decimal::ZERO);
            prop_assert!(!clamped);
        }
    }
}
