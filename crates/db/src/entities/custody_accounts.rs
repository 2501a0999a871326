//! `SeaORM` Entity for custody_accounts table.
//!
//! A custody account is a physical/operational cash holder: a bank account,
//! a vault, or a teller till. Balances are mutated only through the custody
//! repository, which writes a history row per change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CustodyKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "custody_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub currency_id: Uuid,
    pub kind: CustodyKind,
    pub name: String,
    pub balance: Decimal,
    pub locked_balance: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(has_many = "super::till_sessions::Entity")]
    TillSessions,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::till_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TillSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
