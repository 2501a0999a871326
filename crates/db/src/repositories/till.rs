//! Till session resolution.
//!
//! A teller works against an open till session. Lifecycle transitions
//! resolve the acting user's open session, opening one against the
//! organisation's till when permitted by the feature flag.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    custody_accounts, till_sessions,
    sea_orm_active_enums::CustodyKind,
};

/// Error types for till session operations.
#[derive(Debug, thiserror::Error)]
pub enum TillError {
    /// The feature flag requires an open session and none exists.
    #[error("User {0} has no open till session")]
    NoOpenSession(Uuid),

    /// The organisation has no till custody account to open a session on.
    #[error("Organisation {0} has no till custody account")]
    NoTillAccount(Uuid),

    /// Till session not found.
    #[error("Till session not found: {0}")]
    SessionNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Till session repository.
#[derive(Debug, Clone)]
pub struct TillSessionRepository;

impl TillSessionRepository {
    /// Creates a new till session repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolves the acting user's open till session, with its till account.
    ///
    /// When none is open: fails with [`TillError::NoOpenSession`] if
    /// `require_open` is set, otherwise opens a session against the
    /// organisation's till.
    ///
    /// # Errors
    ///
    /// - [`TillError::NoOpenSession`] as above
    /// - [`TillError::NoTillAccount`] when the organisation has no till
    pub async fn resolve_open_session(
        &self,
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        user_id: Uuid,
        require_open: bool,
    ) -> Result<(till_sessions::Model, custody_accounts::Model), TillError> {
        let open = till_sessions::Entity::find()
            .filter(till_sessions::Column::UserId.eq(user_id))
            .filter(till_sessions::Column::ClosedAt.is_null())
            .one(txn)
            .await?;

        if let Some(session) = open {
            let till = custody_accounts::Entity::find_by_id(session.till_account_id)
                .one(txn)
                .await?
                .ok_or(TillError::NoTillAccount(organization_id))?;
            return Ok((session, till));
        }

        if require_open {
            return Err(TillError::NoOpenSession(user_id));
        }

        let till = custody_accounts::Entity::find()
            .filter(custody_accounts::Column::OrganizationId.eq(organization_id))
            .filter(custody_accounts::Column::Kind.eq(CustodyKind::Till))
            .one(txn)
            .await?
            .ok_or(TillError::NoTillAccount(organization_id))?;

        let session = till_sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            till_account_id: Set(till.id),
            user_id: Set(user_id),
            opened_at: Set(Utc::now().into()),
            closed_at: Set(None),
        };
        let session = session.insert(txn).await?;
        info!(%user_id, till_id = %till.id, "opened till session");

        Ok((session, till))
    }

    /// Finds a session by id with its till account.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing or the query fails.
    pub async fn find_with_till(
        &self,
        txn: &DatabaseTransaction,
        session_id: Uuid,
    ) -> Result<(till_sessions::Model, custody_accounts::Model), TillError> {
        let session = till_sessions::Entity::find_by_id(session_id)
            .one(txn)
            .await?
            .ok_or(TillError::SessionNotFound(session_id))?;

        let till = custody_accounts::Entity::find_by_id(session.till_account_id)
            .one(txn)
            .await?
            .ok_or(TillError::SessionNotFound(session_id))?;

        Ok((session, till))
    }

    /// Closes an open session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing or the update fails.
    pub async fn close_session(
        &self,
        txn: &DatabaseTransaction,
        session_id: Uuid,
    ) -> Result<till_sessions::Model, TillError> {
        let session = till_sessions::Entity::find_by_id(session_id)
            .one(txn)
            .await?
            .ok_or(TillError::SessionNotFound(session_id))?;

        let mut active: till_sessions::ActiveModel = session.into();
        active.closed_at = Set(Some(Utc::now().into()));
        Ok(active.update(txn).await?)
    }
}

impl Default for TillSessionRepository {
    fn default() -> Self {
        Self::new()
    }
}
