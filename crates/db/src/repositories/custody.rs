//! Custody balance store.
//!
//! Owns balance mutation and history logging for bank accounts, vaults, and
//! tills. Whether a negative result is permitted is the caller's decision;
//! this store only guarantees that every mutation is atomic with its history
//! row.

use chrono::Utc;
use remvio_shared::{Actor, BalanceAction, BalanceChange};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    custody_accounts,
    sea_orm_active_enums::{BalanceEntityKind, CustodyKind},
};
use crate::repositories::history::{record_balance_history, HistoryEntry};

/// Error types for custody operations.
#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    /// Custody account not found.
    #[error("Custody account not found: {0}")]
    NotFound(Uuid),

    /// Resulting balance would be negative where the caller forbade it.
    #[error("Custody balance would go negative: balance {balance}, change {change}")]
    WouldGoNegative {
        /// Balance before the change.
        balance: Decimal,
        /// Requested signed change.
        change: Decimal,
    },

    /// The two accounts of an internal transfer hold different currencies.
    #[error("Currency mismatch between custody accounts {from} and {to}")]
    CurrencyMismatch {
        /// Source account.
        from: Uuid,
        /// Target account.
        to: Uuid,
    },

    /// Transfer amounts must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Custody account repository.
#[derive(Debug, Clone)]
pub struct CustodyRepository {
    db: DatabaseConnection,
}

impl CustodyRepository {
    /// Creates a new custody repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a custody account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<custody_accounts::Model>, CustodyError> {
        Ok(custody_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?)
    }

    /// Applies a signed balance change to a custody account.
    ///
    /// The row is locked `FOR UPDATE` inside the caller's transaction, the
    /// balance is mutated, and exactly one history row is written. The delta
    /// may be negative; callers that forbid negative results (bank-account
    /// withdrawals) validate sufficiency before calling or pass
    /// `allow_negative = false`.
    ///
    /// # Errors
    ///
    /// - [`CustodyError::NotFound`] when the account does not exist
    /// - [`CustodyError::WouldGoNegative`] when the result is negative and
    ///   `allow_negative` is false
    pub async fn apply_signed_change(
        &self,
        txn: &DatabaseTransaction,
        account_id: Uuid,
        delta: Decimal,
        allow_negative: bool,
        action: BalanceAction,
        description: &str,
        actor: &Actor,
    ) -> Result<BalanceChange, CustodyError> {
        let account = custody_accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(CustodyError::NotFound(account_id))?;

        let old_balance = account.balance;
        let new_balance = old_balance + delta;

        if !allow_negative && new_balance < Decimal::ZERO {
            return Err(CustodyError::WouldGoNegative {
                balance: old_balance,
                change: delta,
            });
        }

        let entity_kind = BalanceEntityKind::from(account.kind.clone());
        let currency_id = account.currency_id;

        let mut active: custody_accounts::ActiveModel = account.into();
        active.balance = Set(new_balance);
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;

        record_balance_history(
            txn,
            HistoryEntry {
                entity_kind,
                entity_id: account_id,
                currency_id,
                old_balance,
                new_balance,
                action,
                description,
                actor,
            },
        )
        .await?;

        Ok(BalanceChange::new(old_balance, new_balance, action))
    }

    /// Moves cash between two custody accounts (vault refill of a till,
    /// till drop into a vault).
    ///
    /// Sufficiency is validated before any balance changes; both mutations
    /// and their history rows commit or roll back together.
    ///
    /// # Errors
    ///
    /// - [`CustodyError::CurrencyMismatch`] when the accounts hold
    ///   different currencies
    /// - [`CustodyError::WouldGoNegative`] when the source is short
    pub async fn transfer_between(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        amount: Decimal,
        description: &str,
        actor: &Actor,
    ) -> Result<(BalanceChange, BalanceChange), CustodyError> {
        if amount <= Decimal::ZERO {
            return Err(CustodyError::NonPositiveAmount(amount));
        }

        let txn = self.db.begin().await?;

        // Lock in id order so two opposing transfers cannot deadlock.
        let (first, second) = if from_id < to_id {
            (from_id, to_id)
        } else {
            (to_id, from_id)
        };
        for account_id in [first, second] {
            custody_accounts::Entity::find_by_id(account_id)
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or(CustodyError::NotFound(account_id))?;
        }

        let from = custody_accounts::Entity::find_by_id(from_id)
            .one(&txn)
            .await?
            .ok_or(CustodyError::NotFound(from_id))?;
        let to = custody_accounts::Entity::find_by_id(to_id)
            .one(&txn)
            .await?
            .ok_or(CustodyError::NotFound(to_id))?;

        if from.currency_id != to.currency_id {
            return Err(CustodyError::CurrencyMismatch {
                from: from_id,
                to: to_id,
            });
        }
        if from.balance < amount {
            return Err(CustodyError::WouldGoNegative {
                balance: from.balance,
                change: -amount,
            });
        }

        let out = self
            .apply_signed_change(
                &txn,
                from_id,
                -amount,
                false,
                BalanceAction::CashOut,
                description,
                actor,
            )
            .await?;
        let into = self
            .apply_signed_change(
                &txn,
                to_id,
                amount,
                true,
                BalanceAction::CashIn,
                description,
                actor,
            )
            .await?;

        txn.commit().await?;
        Ok((out, into))
    }

    /// Finds a till custody account for an organisation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_till_for_org(
        &self,
        txn: &DatabaseTransaction,
        organization_id: Uuid,
    ) -> Result<Option<custody_accounts::Model>, CustodyError> {
        Ok(custody_accounts::Entity::find()
            .filter(custody_accounts::Column::OrganizationId.eq(organization_id))
            .filter(custody_accounts::Column::Kind.eq(CustodyKind::Till))
            .one(txn)
            .await?)
    }
}
