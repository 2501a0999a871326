//! General ledger posting engine.
//!
//! Double-entry postings against org-scoped GL accounts. Posting validates
//! the entry set in core, creates the transaction with its entries, and
//! applies the signed running-balance deltas. Reversal is additive: a new
//! posting with flipped sides, linked back via `reversal_of_id`.

use chrono::Utc;
use remvio_core::ledger::{self, GlEntryInput};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::{
    gl_accounts, gl_entries, gl_transactions,
    sea_orm_active_enums::{EntrySide, GlEntityKind, GlTransactionStatus},
};

/// Chart code of the accounts-payable-to-beneficiary account.
pub const ACCOUNT_BENEFICIARY_PAYABLE: &str = "2110";
/// Chart code of the float-transit-payable account.
pub const ACCOUNT_FLOAT_TRANSIT: &str = "2130";

/// Error types for GL operations.
#[derive(Debug, thiserror::Error)]
pub enum GlError {
    /// GL transaction not found.
    #[error("GL transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// GL account not found.
    #[error("GL account not found: {0}")]
    AccountNotFound(Uuid),

    /// Only POSTED transactions can be reversed.
    #[error("GL transaction {0} is not posted and cannot be reversed")]
    NotPosted(Uuid),

    /// Debits and credits do not match.
    #[error("Unbalanced entries: debits {debit}, credits {credit}")]
    Unbalanced {
        /// Sum of debit entries.
        debit: Decimal,
        /// Sum of credit entries.
        credit: Decimal,
    },

    /// Entry set failed validation (empty, non-positive amount).
    #[error("Invalid entry set: {0}")]
    InvalidEntries(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ledger::LedgerError> for GlError {
    fn from(err: ledger::LedgerError) -> Self {
        match err {
            ledger::LedgerError::Unbalanced { debit, credit } => Self::Unbalanced { debit, credit },
            other => Self::InvalidEntries(other.to_string()),
        }
    }
}

/// A GL transaction with its entries.
#[derive(Debug, Clone)]
pub struct GlTransactionWithEntries {
    /// Transaction header.
    pub transaction: gl_transactions::Model,
    /// Entry rows.
    pub entries: Vec<gl_entries::Model>,
}

/// General ledger repository.
#[derive(Debug, Clone)]
pub struct GlRepository {
    db: DatabaseConnection,
}

impl GlRepository {
    /// Creates a new GL repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a balanced set of entries as one GL transaction.
    ///
    /// Validates the set (non-empty, positive amounts, debits == credits),
    /// inserts the transaction and its entries together, and adjusts each
    /// account's running balance by `+amount` for debits and `-amount` for
    /// credits.
    ///
    /// # Errors
    ///
    /// - [`GlError::Unbalanced`] when the sums differ
    /// - [`GlError::AccountNotFound`] for an unknown account id
    pub async fn post(
        &self,
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        transfer_id: Option<Uuid>,
        description: &str,
        entries: &[GlEntryInput],
    ) -> Result<gl_transactions::Model, GlError> {
        self.post_inner(txn, organization_id, transfer_id, None, description, entries)
            .await
    }

    /// Reverses a posted GL transaction.
    ///
    /// Appends a new transaction whose entries are the originals with
    /// debit/credit flipped and amounts unchanged, then re-applies the
    /// balance deltas. The original is never modified.
    ///
    /// # Errors
    ///
    /// - [`GlError::TransactionNotFound`] for an unknown id
    /// - [`GlError::NotPosted`] when the original is not POSTED
    pub async fn reverse(
        &self,
        txn: &DatabaseTransaction,
        gl_transaction_id: Uuid,
    ) -> Result<gl_transactions::Model, GlError> {
        let original = gl_transactions::Entity::find_by_id(gl_transaction_id)
            .one(txn)
            .await?
            .ok_or(GlError::TransactionNotFound(gl_transaction_id))?;

        if original.status != GlTransactionStatus::Posted {
            return Err(GlError::NotPosted(gl_transaction_id));
        }

        let rows = gl_entries::Entity::find()
            .filter(gl_entries::Column::GlTransactionId.eq(gl_transaction_id))
            .all(txn)
            .await?;

        let original_inputs: Vec<GlEntryInput> = rows
            .into_iter()
            .map(|row| GlEntryInput {
                account_id: row.gl_account_id,
                side: row.side.into(),
                amount: row.amount,
                memo: row.memo,
            })
            .collect();

        let reversed = ledger::reversing_entries(&original_inputs);

        self.post_inner(
            txn,
            original.organization_id,
            original.transfer_id,
            Some(gl_transaction_id),
            &format!("Reversal of GL transaction {gl_transaction_id}"),
            &reversed,
        )
        .await
    }

    /// Resolves the GL account bound to a business entity.
    ///
    /// Returns `None` when no mapping is configured; callers treat that as
    /// "skip GL posting for this leg", never as a failure of the business
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns an error only if the database query fails.
    pub async fn resolve_account_for_entity(
        &self,
        txn: &DatabaseTransaction,
        entity_kind: ledger::GlEntityKind,
        entity_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Uuid>, GlError> {
        let account = gl_accounts::Entity::find()
            .filter(gl_accounts::Column::EntityKind.eq(GlEntityKind::from(entity_kind)))
            .filter(gl_accounts::Column::EntityId.eq(entity_id))
            .filter(gl_accounts::Column::OrganizationId.eq(organization_id))
            .one(txn)
            .await?;

        Ok(account.map(|a| a.id))
    }

    /// Resolves an org-scoped GL account by chart code.
    ///
    /// Same `None` semantics as [`Self::resolve_account_for_entity`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the database query fails.
    pub async fn resolve_account_by_code(
        &self,
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        code: &str,
    ) -> Result<Option<Uuid>, GlError> {
        let account = gl_accounts::Entity::find()
            .filter(gl_accounts::Column::OrganizationId.eq(organization_id))
            .filter(gl_accounts::Column::Code.eq(code))
            .one(txn)
            .await?;

        Ok(account.map(|a| a.id))
    }

    /// Finds the non-reversal POSTED transactions recorded for a transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_postings_for_transfer(
        &self,
        txn: &DatabaseTransaction,
        transfer_id: Uuid,
    ) -> Result<Vec<gl_transactions::Model>, GlError> {
        Ok(gl_transactions::Entity::find()
            .filter(gl_transactions::Column::TransferId.eq(transfer_id))
            .filter(gl_transactions::Column::Status.eq(GlTransactionStatus::Posted))
            .filter(gl_transactions::Column::ReversalOfId.is_null())
            .all(txn)
            .await?)
    }

    /// Gets a GL transaction with its entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is not found or the query fails.
    pub async fn get_transaction(
        &self,
        gl_transaction_id: Uuid,
    ) -> Result<GlTransactionWithEntries, GlError> {
        let transaction = gl_transactions::Entity::find_by_id(gl_transaction_id)
            .one(&self.db)
            .await?
            .ok_or(GlError::TransactionNotFound(gl_transaction_id))?;

        let entries = gl_entries::Entity::find()
            .filter(gl_entries::Column::GlTransactionId.eq(gl_transaction_id))
            .all(&self.db)
            .await?;

        Ok(GlTransactionWithEntries {
            transaction,
            entries,
        })
    }

    /// Shared insert path for postings and reversals.
    async fn post_inner(
        &self,
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        transfer_id: Option<Uuid>,
        reversal_of_id: Option<Uuid>,
        description: &str,
        entries: &[GlEntryInput],
    ) -> Result<gl_transactions::Model, GlError> {
        ledger::validate_entries(entries)?;

        let now = Utc::now();
        let transaction_id = Uuid::new_v4();

        let transaction = gl_transactions::ActiveModel {
            id: Set(transaction_id),
            organization_id: Set(organization_id),
            transfer_id: Set(transfer_id),
            reversal_of_id: Set(reversal_of_id),
            status: Set(GlTransactionStatus::Posted),
            description: Set(description.to_string()),
            posted_at: Set(now.into()),
            created_at: Set(now.into()),
        };
        let transaction = transaction.insert(txn).await?;

        for entry in entries {
            let account = gl_accounts::Entity::find_by_id(entry.account_id)
                .lock_exclusive()
                .one(txn)
                .await?
                .ok_or(GlError::AccountNotFound(entry.account_id))?;

            let new_balance = account.balance + ledger::signed_delta(entry.side, entry.amount);

            let mut active: gl_accounts::ActiveModel = account.into();
            active.balance = Set(new_balance);
            active.updated_at = Set(now.into());
            active.update(txn).await?;

            let row = gl_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                gl_transaction_id: Set(transaction_id),
                gl_account_id: Set(entry.account_id),
                side: Set(EntrySide::from(entry.side)),
                amount: Set(entry.amount),
                memo: Set(entry.memo.clone()),
                created_at: Set(now.into()),
            };
            row.insert(txn).await?;
        }

        Ok(transaction)
    }
}
