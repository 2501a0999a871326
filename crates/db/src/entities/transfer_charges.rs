//! `SeaORM` Entity for transfer_charges table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ChargeKind, TransferChargeStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_charges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub charge_id: Uuid,
    pub kind: ChargeKind,
    pub name: String,
    pub amount: Decimal,
    pub negotiated_rate: Option<Decimal>,
    pub internal_share: Decimal,
    pub origin_share: Decimal,
    pub destination_share: Decimal,
    pub reversible: bool,
    pub status: TransferChargeStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transfers::Entity",
        from = "Column::TransferId",
        to = "super::transfers::Column::Id"
    )]
    Transfers,
    #[sea_orm(has_many = "super::commission_splits::Entity")]
    CommissionSplits,
}

impl Related<super::transfers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transfers.def()
    }
}

impl Related<super::commission_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommissionSplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
