//! `SeaORM` Entity for periodic_org_balances table.
//!
//! Monthly snapshot of an org balance. A partial unique index enforces at
//! most one `is_current` row per org balance; the opening balance of period
//! N+1 always equals the closing balance of period N.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "periodic_org_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub org_balance_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub opening_balance: Decimal,
    pub closing_balance: Option<Decimal>,
    pub transactions_in: Decimal,
    pub transactions_out: Decimal,
    pub commissions: Decimal,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub balance_limit: Decimal,
    pub is_current: bool,
    pub closed_by: Option<Uuid>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::org_balances::Entity",
        from = "Column::OrgBalanceId",
        to = "super::org_balances::Column::Id"
    )]
    OrgBalances,
}

impl Related<super::org_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrgBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
