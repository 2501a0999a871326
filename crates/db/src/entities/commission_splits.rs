//! `SeaORM` Entity for commission_splits table.
//!
//! One row per (transfer charge, role); the settleable unit of commission.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{SplitRole, SplitStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "commission_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transfer_charge_id: Uuid,
    pub transfer_id: Uuid,
    pub role: SplitRole,
    pub organization_id: Option<Uuid>,
    pub amount: Decimal,
    pub status: SplitStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transfer_charges::Entity",
        from = "Column::TransferChargeId",
        to = "super::transfer_charges::Column::Id"
    )]
    TransferCharges,
}

impl Related<super::transfer_charges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferCharges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
