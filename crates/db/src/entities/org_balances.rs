//! `SeaORM` Entity for org_balances table.
//!
//! One row per (base organisation, destination organisation, currency).
//! Invariant: `balance - locked_balance >= 0` at all times.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "org_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub base_org_id: Uuid,
    pub dest_org_id: Uuid,
    pub currency_id: Uuid,
    pub balance: Decimal,
    pub locked_balance: Decimal,
    pub balance_limit: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::periodic_org_balances::Entity")]
    PeriodicOrgBalances,
}

impl Related<super::periodic_org_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PeriodicOrgBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
