//! Balance history writer.
//!
//! Every balance mutation in the engine lands here, inside the caller's
//! `DatabaseTransaction`: if the history insert fails, the balance write
//! rolls back with it.

use chrono::Utc;
use remvio_shared::{Actor, BalanceAction};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, DbErr, Set};
use uuid::Uuid;

use crate::entities::{balance_history, sea_orm_active_enums::BalanceEntityKind};

/// Parameters of one history row.
pub(crate) struct HistoryEntry<'a> {
    pub entity_kind: BalanceEntityKind,
    pub entity_id: Uuid,
    pub currency_id: Uuid,
    pub old_balance: Decimal,
    pub new_balance: Decimal,
    pub action: BalanceAction,
    pub description: &'a str,
    pub actor: &'a Actor,
}

/// Appends one balance history row. Never updated or deleted afterwards.
pub(crate) async fn record_balance_history(
    txn: &DatabaseTransaction,
    entry: HistoryEntry<'_>,
) -> Result<balance_history::Model, DbErr> {
    let row = balance_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        entity_kind: Set(entry.entity_kind),
        entity_id: Set(entry.entity_id),
        currency_id: Set(entry.currency_id),
        old_balance: Set(entry.old_balance),
        new_balance: Set(entry.new_balance),
        change_amount: Set(entry.new_balance - entry.old_balance),
        action: Set(entry.action.as_str().to_string()),
        description: Set(entry.description.to_string()),
        actor_id: Set(entry.actor.user_id),
        actor_ip: Set(entry.actor.ip.clone()),
        created_at: Set(Utc::now().into()),
    };

    row.insert(txn).await
}
