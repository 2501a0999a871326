//! `SeaORM` Entity for balance_history table.
//!
//! Append-only. One row per balance mutation, never updated or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BalanceEntityKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "balance_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_kind: BalanceEntityKind,
    pub entity_id: Uuid,
    pub currency_id: Uuid,
    pub old_balance: Decimal,
    pub new_balance: Decimal,
    pub change_amount: Decimal,
    pub action: String,
    pub description: String,
    pub actor_id: Option<Uuid>,
    pub actor_ip: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
