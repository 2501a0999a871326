//! The charge cascade calculation.
//!
//! Order matters: non-tax charges are computed over the origin amount first,
//! then tax charges are computed over the accumulated non-tax total — taxes
//! tax the fees, not the principal.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::error::ChargeError;
use super::types::{
    ChargeCascade, ChargeDefinition, ChargeKind, ComputedCharge, RateSpec, ShareAmounts,
};

/// Monetary amounts are kept at 2 decimal places, banker's rounding.
const MONEY_DP: u32 = 2;

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Computes the charge cascade for a transfer.
///
/// Selects the active definitions matching the currency, origin organisation,
/// and destination organisation (or global), computes non-tax charges over
/// `origin_amount`, then tax charges over the non-tax total. A definition's
/// rate is replaced by a negotiated rate when one is supplied for its id.
///
/// Zero matching definitions yields an all-zero cascade, not an error.
///
/// # Errors
///
/// - [`ChargeError::NonPositiveAmount`] when `origin_amount <= 0`
/// - [`ChargeError::SharesNotHundred`] when a commission definition's share
///   percentages do not sum to 100
/// - [`ChargeError::NegativeRate`] when a definition or negotiated rate is
///   negative
pub fn calculate(
    origin_amount: Decimal,
    currency_id: Uuid,
    origin_org_id: Uuid,
    dest_org_id: Uuid,
    definitions: &[ChargeDefinition],
    negotiated_rates: &HashMap<Uuid, RateSpec>,
) -> Result<ChargeCascade, ChargeError> {
    if origin_amount <= Decimal::ZERO {
        return Err(ChargeError::NonPositiveAmount(origin_amount));
    }

    // Non-TAX before TAX, stable within each group.
    let mut applicable: Vec<&ChargeDefinition> = definitions
        .iter()
        .filter(|d| d.applies_to(currency_id, origin_org_id, dest_org_id))
        .collect();
    applicable.sort_by_key(|d| d.kind.is_tax());

    if applicable.is_empty() {
        return Ok(ChargeCascade::empty(origin_amount));
    }

    let mut charges = Vec::with_capacity(applicable.len());
    let mut non_tax_total = Decimal::ZERO;
    let mut tax_total = Decimal::ZERO;

    for def in applicable {
        let base = if def.kind.is_tax() {
            non_tax_total
        } else {
            origin_amount
        };

        let (rate, negotiated) = match negotiated_rates.get(&def.id) {
            Some(rate) => (*rate, true),
            None => (def.rate, false),
        };

        let amount = compute_amount(def, rate, base)?;
        let shares = split_shares(def, amount)?;

        if def.kind.is_tax() {
            tax_total += amount;
        } else {
            non_tax_total += amount;
        }

        charges.push(ComputedCharge {
            charge_id: def.id,
            name: def.name.clone(),
            kind: def.kind,
            rate_applied: rate,
            negotiated,
            amount,
            shares,
            reversible: def.reversible,
        });
    }

    Ok(ChargeCascade {
        total_charges: non_tax_total + tax_total,
        total_commissions: non_tax_total,
        total_taxes: tax_total,
        net_amount: origin_amount + non_tax_total + tax_total,
        charges,
    })
}

/// Raw amount from the rate, clamped min-floor first, then max-ceiling.
///
/// The order is deliberate and deterministic: when a definition carries an
/// inconsistent `min > max`, the max ceiling wins.
fn compute_amount(
    def: &ChargeDefinition,
    rate: RateSpec,
    base: Decimal,
) -> Result<Decimal, ChargeError> {
    let raw = match rate {
        RateSpec::Percentage(pct) => {
            if pct < Decimal::ZERO {
                return Err(ChargeError::NegativeRate { charge_id: def.id });
            }
            base * pct / Decimal::ONE_HUNDRED
        }
        RateSpec::Flat(value) => {
            if value < Decimal::ZERO {
                return Err(ChargeError::NegativeRate { charge_id: def.id });
            }
            value
        }
    };

    let mut amount = raw;
    if let Some(min) = def.min_amount {
        amount = amount.max(min);
    }
    if let Some(max) = def.max_amount {
        amount = amount.min(max);
    }

    Ok(round_money(amount))
}

/// Splits a charge amount by the definition's share percentages.
///
/// Internal and destination shares are rounded; the origin share takes the
/// remainder so the three always sum to the charge amount exactly.
fn split_shares(def: &ChargeDefinition, amount: Decimal) -> Result<ShareAmounts, ChargeError> {
    if def.kind == ChargeKind::Commission && def.shares.total() != Decimal::ONE_HUNDRED {
        return Err(ChargeError::SharesNotHundred {
            charge_id: def.id,
            total: def.shares.total(),
        });
    }

    let internal = round_money(amount * def.shares.internal / Decimal::ONE_HUNDRED);
    let destination = round_money(amount * def.shares.destination / Decimal::ONE_HUNDRED);
    let origin = amount - internal - destination;

    Ok(ShareAmounts {
        internal,
        origin,
        destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charge::types::ShareSplit;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn commission(rate: RateSpec) -> ChargeDefinition {
        ChargeDefinition {
            id: Uuid::new_v4(),
            name: "Transfer commission".to_string(),
            kind: ChargeKind::Commission,
            rate,
            min_amount: None,
            max_amount: None,
            currency_id: None,
            origin_org_id: None,
            dest_org_id: None,
            shares: ShareSplit {
                internal: dec!(40),
                origin: dec!(40),
                destination: dec!(20),
            },
            reversible: true,
            active: true,
        }
    }

    fn tax(rate: RateSpec) -> ChargeDefinition {
        ChargeDefinition {
            id: Uuid::new_v4(),
            name: "Levy on fees".to_string(),
            kind: ChargeKind::Tax,
            rate,
            min_amount: None,
            max_amount: None,
            currency_id: None,
            origin_org_id: None,
            dest_org_id: None,
            shares: ShareSplit::internal_only(),
            reversible: true,
            active: true,
        }
    }

    fn ids() -> (Uuid, Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_commission_and_tax_cascade() {
        // 1000 at 2% commission = 20.00; 10% tax on the 20 (not the 1000) = 2.00.
        let (currency, origin, dest) = ids();
        let defs = vec![
            commission(RateSpec::Percentage(dec!(2))),
            tax(RateSpec::Percentage(dec!(10))),
        ];

        let cascade = calculate(
            dec!(1000),
            currency,
            origin,
            dest,
            &defs,
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(cascade.total_commissions, dec!(20.00));
        assert_eq!(cascade.total_taxes, dec!(2.00));
        assert_eq!(cascade.total_charges, dec!(22.00));
        assert_eq!(cascade.net_amount, dec!(1022.00));
    }

    #[test]
    fn test_tax_computed_after_non_tax_regardless_of_input_order() {
        let (currency, origin, dest) = ids();
        // Tax listed first; cascade must still base it on the commission.
        let defs = vec![
            tax(RateSpec::Percentage(dec!(10))),
            commission(RateSpec::Percentage(dec!(2))),
        ];

        let cascade = calculate(
            dec!(1000),
            currency,
            origin,
            dest,
            &defs,
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(cascade.total_taxes, dec!(2.00));
        assert_eq!(cascade.charges[0].kind, ChargeKind::Commission);
        assert_eq!(cascade.charges[1].kind, ChargeKind::Tax);
    }

    #[test]
    fn test_zero_matching_charges_is_empty_cascade() {
        let (currency, origin, dest) = ids();
        let mut def = commission(RateSpec::Percentage(dec!(2)));
        def.origin_org_id = Some(Uuid::new_v4()); // different origin

        let cascade =
            calculate(dec!(1000), currency, origin, dest, &[def], &HashMap::new()).unwrap();

        assert_eq!(cascade.total_charges, Decimal::ZERO);
        assert_eq!(cascade.net_amount, dec!(1000));
        assert!(cascade.charges.is_empty());
    }

    #[test]
    fn test_negotiated_rate_overrides_definition() {
        let (currency, origin, dest) = ids();
        let def = commission(RateSpec::Percentage(dec!(2)));
        let mut negotiated = HashMap::new();
        negotiated.insert(def.id, RateSpec::Percentage(dec!(1)));

        let cascade = calculate(dec!(1000), currency, origin, dest, &[def], &negotiated).unwrap();

        assert_eq!(cascade.total_commissions, dec!(10.00));
        assert!(cascade.charges[0].negotiated);
    }

    #[rstest]
    // min floor applies when raw amount is below it
    #[case(Some(dec!(30)), None, dec!(30.00))]
    // max ceiling applies when raw amount is above it
    #[case(None, Some(dec!(15)), dec!(15.00))]
    // min applied first, then max: inconsistent min > max means max wins
    #[case(Some(dec!(50)), Some(dec!(25)), dec!(25.00))]
    fn test_clamp_order(
        #[case] min: Option<Decimal>,
        #[case] max: Option<Decimal>,
        #[case] expected: Decimal,
    ) {
        let (currency, origin, dest) = ids();
        let mut def = commission(RateSpec::Percentage(dec!(2))); // raw = 20
        def.min_amount = min;
        def.max_amount = max;

        let cascade =
            calculate(dec!(1000), currency, origin, dest, &[def], &HashMap::new()).unwrap();

        assert_eq!(cascade.total_commissions, expected);
    }

    #[test]
    fn test_flat_charge() {
        let (currency, origin, dest) = ids();
        let def = commission(RateSpec::Flat(dec!(7.50)));

        let cascade =
            calculate(dec!(1000), currency, origin, dest, &[def], &HashMap::new()).unwrap();

        assert_eq!(cascade.total_commissions, dec!(7.50));
    }

    #[test]
    fn test_shares_sum_to_charge_amount() {
        let (currency, origin, dest) = ids();
        // 3% of 333.33 = 10.00 (rounded); 40/40/20 split has a remainder.
        let def = commission(RateSpec::Percentage(dec!(3)));

        let cascade =
            calculate(dec!(333.33), currency, origin, dest, &[def], &HashMap::new()).unwrap();

        let charge = &cascade.charges[0];
        assert_eq!(charge.shares.total(), charge.amount);
    }

    #[test]
    fn test_commission_shares_must_sum_to_hundred() {
        let (currency, origin, dest) = ids();
        let mut def = commission(RateSpec::Percentage(dec!(2)));
        def.shares = ShareSplit {
            internal: dec!(50),
            origin: dec!(30),
            destination: dec!(10),
        };

        let result = calculate(dec!(1000), currency, origin, dest, &[def], &HashMap::new());
        assert!(matches!(
            result,
            Err(ChargeError::SharesNotHundred { total, .. }) if total == dec!(90)
        ));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let (currency, origin, dest) = ids();
        let result = calculate(dec!(0), currency, origin, dest, &[], &HashMap::new());
        assert!(matches!(result, Err(ChargeError::NonPositiveAmount(_))));

        let result = calculate(dec!(-5), currency, origin, dest, &[], &HashMap::new());
        assert!(matches!(result, Err(ChargeError::NonPositiveAmount(_))));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let (currency, origin, dest) = ids();
        let def = commission(RateSpec::Percentage(dec!(-2)));
        let result = calculate(dec!(1000), currency, origin, dest, &[def], &HashMap::new());
        assert!(matches!(result, Err(ChargeError::NegativeRate { .. })));
    }
}

/// Property-based tests for the cascade arithmetic.
#[cfg(test)]
mod props {
    use super::*;
    use crate::charge::types::ShareSplit;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn pct_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=2_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn single_commission(pct: Decimal) -> ChargeDefinition {
        ChargeDefinition {
            id: Uuid::new_v4(),
            name: "Commission".to_string(),
            kind: ChargeKind::Commission,
            rate: RateSpec::Percentage(pct),
            min_amount: None,
            max_amount: None,
            currency_id: None,
            origin_org_id: None,
            dest_org_id: None,
            shares: ShareSplit {
                internal: dec!(34),
                origin: dec!(33),
                destination: dec!(33),
            },
            reversible: true,
            active: true,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Totals are internally consistent for any amount and rate.
        #[test]
        fn prop_totals_consistent(amount in amount_strategy(), pct in pct_strategy()) {
            let defs = vec![single_commission(pct)];
            let cascade = calculate(
                amount,
                Uuid::nil(),
                Uuid::nil(),
                Uuid::nil(),
                &defs,
                &HashMap::new(),
            ).unwrap();

            prop_assert_eq!(
                cascade.total_charges,
                cascade.total_commissions + cascade.total_taxes
            );
            prop_assert_eq!(cascade.net_amount, amount + cascade.total_charges);
        }

        /// Share amounts always sum to the charge amount exactly.
        #[test]
        fn prop_shares_sum_to_amount(amount in amount_strategy(), pct in pct_strategy()) {
            let defs = vec![single_commission(pct)];
            let cascade = calculate(
                amount,
                Uuid::nil(),
                Uuid::nil(),
                Uuid::nil(),
                &defs,
                &HashMap::new(),
            ).unwrap();

            for charge in &cascade.charges {
                prop_assert_eq!(charge.shares.total(), charge.amount);
            }
        }

        /// A tax never exceeds its base: tax_total <= rate% of non_tax_total.
        #[test]
        fn prop_tax_based_on_fees(amount in amount_strategy(), pct in pct_strategy()) {
            let defs = vec![
                single_commission(dec!(2)),
                ChargeDefinition {
                    id: Uuid::new_v4(),
                    name: "Tax".to_string(),
                    kind: ChargeKind::Tax,
                    rate: RateSpec::Percentage(pct),
                    min_amount: None,
                    max_amount: None,
                    currency_id: None,
                    origin_org_id: None,
                    dest_org_id: None,
                    shares: ShareSplit::internal_only(),
                    reversible: true,
                    active: true,
                },
            ];
            let cascade = calculate(
                amount,
                Uuid::nil(),
                Uuid::nil(),
                Uuid::nil(),
                &defs,
                &HashMap::new(),
            ).unwrap();

            let expected_tax = (cascade.total_commissions * pct / dec!(100))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
            prop_assert_eq!(cascade.total_taxes, expected_tax);
        }
    }
}
