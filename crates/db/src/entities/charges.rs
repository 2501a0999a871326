//! `SeaORM` Entity for charges table (charge definitions).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ChargeKind, RateKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "charges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub kind: ChargeKind,
    pub rate_kind: RateKind,
    pub rate_value: Decimal,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub currency_id: Option<Uuid>,
    pub origin_org_id: Option<Uuid>,
    pub dest_org_id: Option<Uuid>,
    pub internal_share: Decimal,
    pub origin_share: Decimal,
    pub destination_share: Decimal,
    pub reversible: bool,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
