//! `SeaORM` Entity for corridors table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CorridorStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "corridors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub origin_org_id: Uuid,
    pub dest_org_id: Uuid,
    pub currency_id: Uuid,
    pub status: CorridorStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OriginOrgId",
        to = "super::organizations::Column::Id"
    )]
    OriginOrganization,
}

impl ActiveModelBehavior for ActiveModel {}
