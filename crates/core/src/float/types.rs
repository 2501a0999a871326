//! Float ledger domain types.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of one organisation float balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatBalance {
    /// Total float balance.
    pub balance: Decimal,
    /// Portion reserved against approved-but-unsettled transfers.
    pub locked: Decimal,
    /// Configured limit, carried across periods.
    pub limit: Decimal,
}

impl FloatBalance {
    /// Balance available for new transfers.
    ///
    /// Invariant: never negative while mutations go through the rules in
    /// this module.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.balance - self.locked
    }
}

/// Which periodic accumulator an amount belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorKind {
    /// Float funding received.
    Deposit,
    /// Float withdrawn.
    Withdrawal,
    /// Commission earned.
    Commission,
    /// Value of transfers settled into this float.
    TransactionIn,
    /// Value of transfers settled out of this float.
    TransactionOut,
}

/// Calendar-month key of a periodic snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl PeriodKey {
    /// The period containing the given date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the period.
    #[must_use]
    pub fn start_date(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(self.year, 1, 1).unwrap_or_default())
    }

    /// Last day of the period.
    #[must_use]
    pub fn end_date(self) -> NaiveDate {
        self.next()
            .start_date()
            .pred_opt()
            .unwrap_or_else(|| self.start_date())
    }
}

/// Period-scoped activity accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodActivity {
    /// Value settled into the float this period.
    pub transactions_in: Decimal,
    /// Value settled out of the float this period.
    pub transactions_out: Decimal,
    /// Commission earned this period.
    pub commissions: Decimal,
    /// Float funding received this period.
    pub deposits: Decimal,
    /// Float withdrawn this period.
    pub withdrawals: Decimal,
}

impl PeriodActivity {
    /// The closing balance implied by an opening balance and this activity.
    #[must_use]
    pub fn closing_balance(&self, opening: Decimal) -> Decimal {
        opening + self.transactions_in - self.transactions_out + self.commissions + self.deposits
            - self.withdrawals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_available_balance() {
        let float = FloatBalance {
            balance: dec!(1000),
            locked: dec!(150),
            limit: dec!(5000),
        };
        assert_eq!(float.available(), dec!(850));
    }

    #[test]
    fn test_period_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let key = PeriodKey::from_date(date);
        assert_eq!(key, PeriodKey { year: 2026, month: 8 });
    }

    #[test]
    fn test_period_key_next_wraps_year() {
        let december = PeriodKey { year: 2026, month: 12 };
        assert_eq!(december.next(), PeriodKey { year: 2027, month: 1 });

        let june = PeriodKey { year: 2026, month: 6 };
        assert_eq!(june.next(), PeriodKey { year: 2026, month: 7 });
    }

    #[test]
    fn test_period_bounds() {
        let feb_leap = PeriodKey { year: 2024, month: 2 };
        assert_eq!(
            feb_leap.end_date(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );

        let feb = PeriodKey { year: 2026, month: 2 };
        assert_eq!(
            feb.end_date(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );

        let december = PeriodKey { year: 2026, month: 12 };
        assert_eq!(
            december.start_date(),
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()
        );
        assert_eq!(
            december.end_date(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_closing_balance_arithmetic() {
        let activity = PeriodActivity {
            transactions_in: dec!(300),
            transactions_out: dec!(120),
            commissions: dec!(15),
            deposits: dec!(500),
            withdrawals: dec!(50),
        };
        // 1000 + 300 - 120 + 15 + 500 - 50
        assert_eq!(activity.closing_balance(dec!(1000)), dec!(1645));
    }

    #[test]
    fn test_empty_activity_carries_opening() {
        let activity = PeriodActivity::default();
        assert_eq!(activity.closing_balance(dec!(777)), dec!(777));
    }
}
