//! `SeaORM` Entity for transfers table (the business transfer record).
//!
//! `amount_payable` is the amount plus all charges — the value locked on
//! the origin float at approval. Internally-linked inbound transfers carry
//! `linked_transfer_id` back to the originating outbound.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{
    RemittanceStatus, RequestStatus, TransferDirection, TransferStatus,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub direction: TransferDirection,
    pub origin_org_id: Uuid,
    pub dest_org_id: Uuid,
    pub corridor_id: Uuid,
    pub customer_id: Uuid,
    pub beneficiary_id: Uuid,
    pub currency_id: Uuid,
    pub amount: Decimal,
    pub total_commissions: Decimal,
    pub total_taxes: Decimal,
    pub total_all_charges: Decimal,
    pub amount_payable: Decimal,
    pub status: TransferStatus,
    pub remittance_status: RemittanceStatus,
    pub request_status: RequestStatus,
    pub till_session_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub linked_transfer_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfer_charges::Entity")]
    TransferCharges,
    #[sea_orm(has_many = "super::transfer_audits::Entity")]
    TransferAudits,
    #[sea_orm(
        belongs_to = "super::corridors::Entity",
        from = "Column::CorridorId",
        to = "super::corridors::Column::Id"
    )]
    Corridors,
}

impl Related<super::transfer_charges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferCharges.def()
    }
}

impl Related<super::transfer_audits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferAudits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
