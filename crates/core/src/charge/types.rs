//! Charge domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a charge definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    /// A commission shared between the platform and the organisations.
    Commission,
    /// A flat service fee kept by the platform.
    Fee,
    /// A tax levied on the fees (not on the principal).
    Tax,
}

impl ChargeKind {
    /// Returns true for tax charges, which are computed over the non-tax
    /// total instead of the origin amount.
    #[must_use]
    pub const fn is_tax(self) -> bool {
        matches!(self, Self::Tax)
    }
}

/// How a charge amount is derived from its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSpec {
    /// Percentage of the base amount (e.g. `dec!(2)` for 2%).
    Percentage(Decimal),
    /// Flat amount regardless of the base.
    Flat(Decimal),
}

/// Share percentages splitting a commission between parties.
///
/// Must sum to exactly 100 for commission-kind charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSplit {
    /// Platform share percentage.
    pub internal: Decimal,
    /// Origin organisation share percentage.
    pub origin: Decimal,
    /// Destination organisation share percentage.
    pub destination: Decimal,
}

impl ShareSplit {
    /// A split where the platform keeps everything.
    #[must_use]
    pub const fn internal_only() -> Self {
        Self {
            internal: Decimal::ONE_HUNDRED,
            origin: Decimal::ZERO,
            destination: Decimal::ZERO,
        }
    }

    /// Sum of the three percentages.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.internal + self.origin + self.destination
    }
}

/// A configured charge definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeDefinition {
    /// Definition id.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Charge classification.
    pub kind: ChargeKind,
    /// Rate applied when no negotiated override exists.
    pub rate: RateSpec,
    /// Lower clamp on the computed amount.
    pub min_amount: Option<Decimal>,
    /// Upper clamp on the computed amount.
    pub max_amount: Option<Decimal>,
    /// Currency the definition applies to (None = any).
    pub currency_id: Option<Uuid>,
    /// Origin organisation scope (None = any).
    pub origin_org_id: Option<Uuid>,
    /// Destination organisation scope (None = global).
    pub dest_org_id: Option<Uuid>,
    /// Commission share percentages.
    pub shares: ShareSplit,
    /// Whether the charge is undone when the transfer is reversed.
    pub reversible: bool,
    /// Whether the definition is active.
    pub active: bool,
}

impl ChargeDefinition {
    /// Returns true when this definition applies to the given
    /// currency/origin/destination combination.
    #[must_use]
    pub fn applies_to(&self, currency_id: Uuid, origin_org_id: Uuid, dest_org_id: Uuid) -> bool {
        self.active
            && self.currency_id.is_none_or(|c| c == currency_id)
            && self.origin_org_id.is_none_or(|o| o == origin_org_id)
            && self.dest_org_id.is_none_or(|d| d == dest_org_id)
    }
}

/// Monetary share amounts of one computed charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAmounts {
    /// Platform share.
    pub internal: Decimal,
    /// Origin organisation share.
    pub origin: Decimal,
    /// Destination organisation share.
    pub destination: Decimal,
}

impl ShareAmounts {
    /// Sum of the three shares; always equals the charge amount.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.internal + self.origin + self.destination
    }
}

/// One charge instantiated against a transfer amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedCharge {
    /// The definition this was computed from.
    pub charge_id: Uuid,
    /// Definition name, carried for persistence/display.
    pub name: String,
    /// Charge classification.
    pub kind: ChargeKind,
    /// The rate actually applied (negotiated override or definition rate).
    pub rate_applied: RateSpec,
    /// True when a negotiated rate replaced the definition rate.
    pub negotiated: bool,
    /// Computed (clamped, rounded) amount.
    pub amount: Decimal,
    /// Three-way share breakdown.
    pub shares: ShareAmounts,
    /// Copied from the definition.
    pub reversible: bool,
}

/// Result of the charge cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeCascade {
    /// Sum of all charges (commissions, fees, and taxes).
    pub total_charges: Decimal,
    /// Sum of non-tax charges.
    pub total_commissions: Decimal,
    /// Sum of tax charges.
    pub total_taxes: Decimal,
    /// Origin amount plus all charges (what the sender pays).
    pub net_amount: Decimal,
    /// Per-charge breakdown, non-tax first.
    pub charges: Vec<ComputedCharge>,
}

impl ChargeCascade {
    /// Cascade with no matching charges.
    #[must_use]
    pub fn empty(origin_amount: Decimal) -> Self {
        Self {
            total_charges: Decimal::ZERO,
            total_commissions: Decimal::ZERO,
            total_taxes: Decimal::ZERO,
            net_amount: origin_amount,
            charges: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn definition(kind: ChargeKind) -> ChargeDefinition {
        ChargeDefinition {
            id: Uuid::new_v4(),
            name: "Test charge".to_string(),
            kind,
            rate: RateSpec::Percentage(dec!(2)),
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

    #[test]
    fn test_global_definition_applies_everywhere() {
        let def = definition(ChargeKind::Commission);
        assert!(def.applies_to(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()));
    }

    #[test]
    fn test_inactive_definition_never_applies() {
        let mut def = definition(ChargeKind::Commission);
        def.active = false;
        assert!(!def.applies_to(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()));
    }

    #[test]
    fn test_scoped_definition_matches_scope() {
        let currency = Uuid::new_v4();
        let origin = Uuid::new_v4();
        let dest = Uuid::new_v4();

        let mut def = definition(ChargeKind::Fee);
        def.currency_id = Some(currency);
        def.origin_org_id = Some(origin);
        def.dest_org_id = Some(dest);

        assert!(def.applies_to(currency, origin, dest));
        assert!(!def.applies_to(currency, origin, Uuid::new_v4()));
        assert!(!def.applies_to(currency, Uuid::new_v4(), dest));
        assert!(!def.applies_to(Uuid::new_v4(), origin, dest));
    }

    #[test]
    fn test_share_split_total() {
        let split = ShareSplit {
            internal: dec!(50),
            origin: dec!(30),
            destination: dec!(20),
        };
        assert_eq!(split.total(), dec!(100));
        assert_eq!(ShareSplit::internal_only().total(), dec!(100));
    }

    #[test]
    fn test_empty_cascade() {
        let cascade = ChargeCascade::empty(dec!(500));
        assert_eq!(cascade.total_charges, Decimal::ZERO);
        assert_eq!(cascade.net_amount, dec!(500));
        assert!(cascade.charges.is_empty());
    }
}
