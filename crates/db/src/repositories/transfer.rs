//! Transfer lifecycle orchestration.
//!
//! Each transition runs in one `DatabaseTransaction`: the transfer row is
//! loaded `FOR UPDATE`, legality is checked by the core state machine, the
//! custody/float/GL components are called with the same transaction handle,
//! and the status write carries an expected-status predicate so a stale
//! writer surfaces as a conflict instead of double-applying a lock or a
//! posting.

use std::collections::HashMap;

use chrono::Utc;
use remvio_core::charge::{self, ChargeCascade, ChargeDefinition, ChargeError, RateSpec, ShareSplit};
use remvio_core::float::AccumulatorKind;
use remvio_core::ledger::{EntrySide, GlEntityKind, GlEntryInput};
use remvio_core::lifecycle::{self, LifecycleError, TransferAction};
use remvio_shared::{Actor, AppError, BalanceAction, TransferConfig};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{
    AuditAction, CorridorStatus, IntegrationKind, RemittanceStatus, RequestStatus, SplitRole,
    SplitStatus, TransferChargeStatus, TransferDirection, TransferStatus,
};
use crate::entities::{
    beneficiaries, charges, commission_splits, corridors, customers, organizations,
    transfer_audits, transfer_charges, transfers, users,
};
use crate::repositories::custody::{CustodyError, CustodyRepository};
use crate::repositories::float_ledger::{FloatLedgerError, FloatLedgerRepository};
use crate::repositories::gl::{
    GlError, GlRepository, ACCOUNT_BENEFICIARY_PAYABLE, ACCOUNT_FLOAT_TRANSIT,
};
use crate::repositories::parameter::{ParameterRepository, PARAM_REQUIRE_OPEN_TILL};
use crate::repositories::till::{TillError, TillSessionRepository};

/// Error types for transfer lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Referenced record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    Business(String),

    /// Available float is short.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Available balance at the time of the check.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// Concurrent modification detected by the expected-status predicate.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Illegal state transition.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Charge cascade failure.
    #[error(transparent)]
    Charge(#[from] ChargeError),

    /// Float ledger failure.
    #[error(transparent)]
    Float(#[from] FloatLedgerError),

    /// GL posting failure.
    #[error(transparent)]
    Gl(#[from] GlError),

    /// Custody store failure.
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// Till session failure.
    #[error(transparent)]
    Till(#[from] TillError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::NotFound(msg) => Self::NotFound(msg),
            TransferError::Business(msg) => Self::BusinessRule(msg),
            TransferError::InsufficientFunds {
                available,
                requested,
            } => Self::InsufficientFunds {
                available,
                requested,
            },
            TransferError::Conflict(msg) => Self::Conflict(msg),
            TransferError::Lifecycle(err) => err.into(),
            TransferError::Charge(err) => err.into(),
            TransferError::Float(FloatLedgerError::Rules(err)) => err.into(),
            TransferError::Gl(GlError::Unbalanced { debit, credit }) => {
                Self::UnbalancedEntries { debit, credit }
            }
            TransferError::Database(err) => Self::Database(err.to_string()),
            other => Self::BusinessRule(other.to_string()),
        }
    }
}

/// Negotiated rate override for one charge definition.
#[derive(Debug, Clone, Copy)]
pub struct NegotiatedRate {
    /// The charge the override applies to.
    pub charge_id: Uuid,
    /// The replacement rate.
    pub rate: RateSpec,
}

/// Input for creating an outbound transfer.
#[derive(Debug, Clone)]
pub struct CreateOutboundInput {
    /// The sending organisation.
    pub origin_org_id: Uuid,
    /// The corridor the transfer rides on (defines destination + currency).
    pub corridor_id: Uuid,
    /// The sending customer.
    pub customer_id: Uuid,
    /// The receiving beneficiary (must belong to the customer).
    pub beneficiary_id: Uuid,
    /// Principal amount in the corridor currency.
    pub amount: Decimal,
    /// Negotiated rate overrides.
    pub negotiated_rates: Vec<NegotiatedRate>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Input for updating a not-yet-approved outbound transfer.
#[derive(Debug, Clone, Default)]
pub struct UpdateOutboundInput {
    /// New principal amount, if changing.
    pub amount: Option<Decimal>,
    /// New beneficiary, if changing.
    pub beneficiary_id: Option<Uuid>,
    /// Replacement negotiated rates; None keeps the existing ones.
    pub negotiated_rates: Option<Vec<NegotiatedRate>>,
    /// Replacement notes.
    pub notes: Option<String>,
}

/// Filter options for listing transfers. Every field is optional; unset
/// fields do not constrain the query.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    /// Filter by primary status.
    pub status: Option<TransferStatus>,
    /// Filter by direction.
    pub direction: Option<TransferDirection>,
    /// Filter by origin organisation.
    pub origin_org_id: Option<Uuid>,
    /// Filter by destination organisation.
    pub dest_org_id: Option<Uuid>,
}

/// A transfer with its charge rows.
#[derive(Debug, Clone)]
pub struct TransferWithCharges {
    /// The transfer record.
    pub transfer: transfers::Model,
    /// Its charges.
    pub charges: Vec<transfer_charges::Model>,
}

/// Transfer lifecycle service.
///
/// Holds the platform (base) organisation id explicitly; nothing in here
/// re-queries an ambient "current organisation".
#[derive(Debug, Clone)]
pub struct TransferService {
    db: DatabaseConnection,
    platform_org_id: Uuid,
    defaults: TransferConfig,
    custody: CustodyRepository,
    float_ledger: FloatLedgerRepository,
    gl: GlRepository,
    tills: TillSessionRepository,
    parameters: ParameterRepository,
}

impl TransferService {
    /// Creates the service for a given platform organisation.
    ///
    /// `defaults` supplies the configured fallbacks for feature flags the
    /// parameter store does not override.
    #[must_use]
    pub fn new(db: DatabaseConnection, platform_org_id: Uuid, defaults: TransferConfig) -> Self {
        Self {
            custody: CustodyRepository::new(db.clone()),
            float_ledger: FloatLedgerRepository::new(db.clone()),
            gl: GlRepository::new(db.clone()),
            tills: TillSessionRepository::new(),
            parameters: ParameterRepository::new(db.clone()),
            db,
            platform_org_id,
            defaults,
        }
    }

    /// Reads the open-till requirement, preferring the parameter store.
    async fn require_open_till(&self) -> Result<bool, DbErr> {
        self.parameters
            .bool_value(PARAM_REQUIRE_OPEN_TILL, self.defaults.require_open_till)
            .await
    }

    /// Creates an outbound transfer in PENDING_APPROVAL.
    ///
    /// Validates the corridor (active, scoped to the organisation pair),
    /// customer and beneficiary ownership, prices the transfer through the
    /// charge cascade, and requires the origin float to cover
    /// `amount + charges`. Nothing is locked or moved yet.
    ///
    /// # Errors
    ///
    /// - [`TransferError::NotFound`] for missing corridor/customer/beneficiary
    /// - [`TransferError::Business`] for an unfunded origin float or
    ///   scoping violations
    /// - [`TransferError::InsufficientFunds`] when the float is short
    pub async fn create_outbound(
        &self,
        input: CreateOutboundInput,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let acting_user = require_user(actor)?;
        let require_open_till = self.require_open_till().await?;

        let txn = self.db.begin().await?;

        let corridor = corridors::Entity::find_by_id(input.corridor_id)
            .one(&txn)
            .await?
            .ok_or_else(|| TransferError::NotFound(format!("corridor {}", input.corridor_id)))?;
        if corridor.status != CorridorStatus::Active {
            return Err(TransferError::Business("corridor is not active".into()));
        }
        if corridor.origin_org_id != input.origin_org_id {
            return Err(TransferError::Business(
                "corridor is not scoped to the origin organisation".into(),
            ));
        }
        if corridor.origin_org_id == corridor.dest_org_id {
            return Err(TransferError::Business(
                "origin and destination organisations are identical".into(),
            ));
        }
        let dest_org_id = corridor.dest_org_id;
        let currency_id = corridor.currency_id;

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| TransferError::NotFound(format!("customer {}", input.customer_id)))?;
        if customer.organization_id != input.origin_org_id {
            return Err(TransferError::Business(
                "customer does not belong to the origin organisation".into(),
            ));
        }

        let beneficiary = beneficiaries::Entity::find_by_id(input.beneficiary_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                TransferError::NotFound(format!("beneficiary {}", input.beneficiary_id))
            })?;
        if beneficiary.customer_id != customer.id {
            return Err(TransferError::Business(
                "beneficiary does not belong to the customer".into(),
            ));
        }

        let (session, _till) = self
            .tills
            .resolve_open_session(&txn, input.origin_org_id, acting_user, require_open_till)
            .await?;

        let definitions = load_charge_definitions(&txn).await?;
        let negotiated = negotiated_map(&input.negotiated_rates);
        let cascade = charge::calculate(
            input.amount,
            currency_id,
            input.origin_org_id,
            dest_org_id,
            &definitions,
            &negotiated,
        )?;
        let amount_payable = input.amount + cascade.total_charges;

        // The origin float must have been funded and must cover the payable.
        let org_balance = self
            .float_ledger
            .find_locked(&txn, self.platform_org_id, input.origin_org_id, currency_id)
            .await?
            .ok_or_else(|| {
                TransferError::Business("origin agency must deposit float first".into())
            })?;
        let available = org_balance.balance - org_balance.locked_balance;
        if available < amount_payable {
            return Err(TransferError::InsufficientFunds {
                available,
                requested: amount_payable,
            });
        }

        let now = Utc::now();
        let transfer_id = Uuid::new_v4();
        let row = transfers::ActiveModel {
            id: Set(transfer_id),
            number: Set(generate_number()),
            direction: Set(TransferDirection::Outbound),
            origin_org_id: Set(input.origin_org_id),
            dest_org_id: Set(dest_org_id),
            corridor_id: Set(corridor.id),
            customer_id: Set(customer.id),
            beneficiary_id: Set(beneficiary.id),
            currency_id: Set(currency_id),
            amount: Set(input.amount),
            total_commissions: Set(cascade.total_commissions),
            total_taxes: Set(cascade.total_taxes),
            total_all_charges: Set(cascade.total_charges),
            amount_payable: Set(amount_payable),
            status: Set(TransferStatus::PendingApproval),
            remittance_status: Set(RemittanceStatus::Pending),
            request_status: Set(RequestStatus::Pending),
            till_session_id: Set(Some(session.id)),
            assigned_user_id: Set(None),
            linked_transfer_id: Set(None),
            notes: Set(input.notes),
            created_by: Set(Some(acting_user)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let transfer = row.insert(&txn).await?;

        let charge_rows = persist_cascade(
            &txn,
            transfer_id,
            &cascade,
            self.platform_org_id,
            input.origin_org_id,
            dest_org_id,
        )
        .await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::Created,
            None,
            TransferStatus::PendingApproval,
            None,
            actor,
        )
        .await?;

        txn.commit().await?;
        info!(
            transfer_id = %transfer_id,
            number = %transfer.number,
            amount = %transfer.amount,
            "outbound transfer created"
        );

        Ok(TransferWithCharges {
            transfer,
            charges: charge_rows,
        })
    }

    /// Approves an outbound transfer.
    ///
    /// Re-validates available float against `amount_payable`, locks it,
    /// moves cash into the till, posts the approval GL transaction, and for
    /// internally-integrated destinations creates the mirrored inbound
    /// transfer (refusing when one already exists).
    ///
    /// # Errors
    ///
    /// - [`TransferError::Lifecycle`] when the status does not allow approval
    /// - [`TransferError::InsufficientFunds`] when the float is short
    /// - [`TransferError::Conflict`] on a concurrent status change or an
    ///   existing inbound mirror
    pub async fn approve_outbound(
        &self,
        transfer_id: Uuid,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let acting_user = require_user(actor)?;
        let require_open_till = self.require_open_till().await?;

        let txn = self.db.begin().await?;
        let transfer = load_transfer_locked(&txn, transfer_id).await?;
        require_direction(&transfer, TransferDirection::Outbound)?;

        let outcome = lifecycle::apply(
            transfer.direction.clone().into(),
            TransferAction::Approve,
            transfer.status.clone().into(),
            transfer.remittance_status.clone().into(),
        )?;

        let org_balance = self
            .float_ledger
            .find_locked(
                &txn,
                self.platform_org_id,
                transfer.origin_org_id,
                transfer.currency_id,
            )
            .await?
            .ok_or_else(|| {
                TransferError::Business("origin agency must deposit float first".into())
            })?;

        let available = org_balance.balance - org_balance.locked_balance;
        if available < transfer.amount_payable {
            return Err(TransferError::InsufficientFunds {
                available,
                requested: transfer.amount_payable,
            });
        }

        self.float_ledger
            .lock(
                &txn,
                &org_balance,
                transfer.amount_payable,
                &format!("Lock for transfer {}", transfer.number),
                actor,
            )
            .await?;

        let (_session, till) = match transfer.till_session_id {
            Some(session_id) => self.tills.find_with_till(&txn, session_id).await?,
            None => {
                self.tills
                    .resolve_open_session(&txn, transfer.origin_org_id, acting_user, require_open_till)
                    .await?
            }
        };
        self.custody
            .apply_signed_change(
                &txn,
                till.id,
                transfer.amount_payable,
                true,
                BalanceAction::CashIn,
                &format!("Cash received for transfer {}", transfer.number),
                actor,
            )
            .await?;

        let active_charges = transfer_charges::Entity::find()
            .filter(transfer_charges::Column::TransferId.eq(transfer_id))
            .filter(transfer_charges::Column::Status.eq(TransferChargeStatus::Active))
            .all(&txn)
            .await?;
        self.post_approval_gl(&txn, &transfer, org_balance.id, till.id, &active_charges)
            .await?;

        let dest_org = organizations::Entity::find_by_id(transfer.dest_org_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                TransferError::NotFound(format!("organisation {}", transfer.dest_org_id))
            })?;

        let mut new_remittance = outcome.remittance.map(RemittanceStatus::from);
        if dest_org.integration == IntegrationKind::Internal {
            self.create_inbound_mirror(&txn, &transfer, acting_user, actor)
                .await?;
            // The money is now in transit: the outbound can no longer be
            // reversed directly.
            new_remittance = Some(RemittanceStatus::Transit);
        }

        let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
        update.status = Set(TransferStatus::from(outcome.status));
        if let Some(remittance) = new_remittance {
            update.remittance_status = Set(remittance);
        }
        update.request_status = Set(RequestStatus::from(outcome.request));
        cas_update(&txn, transfer_id, &transfer.status, update).await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::Approved,
            Some(transfer.status.clone()),
            TransferStatus::from(outcome.status),
            None,
            actor,
        )
        .await?;

        txn.commit().await?;
        info!(
            transfer_id = %transfer_id,
            number = %transfer.number,
            amount_payable = %transfer.amount_payable,
            "outbound transfer approved"
        );

        self.get_with_charges(transfer_id).await
    }

    /// Marks a transfer ready, optionally reassigning the handling user.
    ///
    /// # Errors
    ///
    /// - [`TransferError::Lifecycle`] outside PENDING/PENDING_APPROVAL
    /// - [`TransferError::Business`] when the new user belongs to another
    ///   organisation
    pub async fn mark_ready(
        &self,
        transfer_id: Uuid,
        reassign_to: Option<Uuid>,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let txn = self.db.begin().await?;
        let transfer = load_transfer_locked(&txn, transfer_id).await?;

        let outcome = lifecycle::apply(
            transfer.direction.clone().into(),
            TransferAction::MarkReady,
            transfer.status.clone().into(),
            transfer.remittance_status.clone().into(),
        )?;

        let handling_org = match transfer.direction {
            TransferDirection::Outbound => transfer.origin_org_id,
            TransferDirection::Inbound => transfer.dest_org_id,
        };

        let mut reassigned = false;
        let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
        if let Some(user_id) = reassign_to {
            let user = users::Entity::find_by_id(user_id)
                .one(&txn)
                .await?
                .ok_or_else(|| TransferError::NotFound(format!("user {user_id}")))?;
            if user.organization_id != handling_org {
                return Err(TransferError::Business(
                    "assigned user must belong to the handling organisation".into(),
                ));
            }
            update.assigned_user_id = Set(Some(user_id));
            reassigned = true;
        }

        update.status = Set(TransferStatus::from(outcome.status));
        update.request_status = Set(RequestStatus::from(outcome.request));
        cas_update(&txn, transfer_id, &transfer.status, update).await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::MadeReady,
            Some(transfer.status.clone()),
            TransferStatus::from(outcome.status),
            None,
            actor,
        )
        .await?;
        if reassigned {
            write_audit(
                &txn,
                transfer_id,
                AuditAction::Reassigned,
                Some(transfer.status.clone()),
                TransferStatus::from(outcome.status),
                reassign_to.map(|u| format!("Reassigned to user {u}")),
                actor,
            )
            .await?;
        }

        txn.commit().await?;
        self.get_with_charges(transfer_id).await
    }

    /// Updates a not-yet-approved outbound transfer and recomputes charges.
    ///
    /// Charge and split rows are replaced atomically (delete-then-recreate
    /// within the transaction); an amount change re-validates the float
    /// against the new payable.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::create_outbound`].
    pub async fn update_outbound(
        &self,
        transfer_id: Uuid,
        input: UpdateOutboundInput,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let txn = self.db.begin().await?;
        let transfer = load_transfer_locked(&txn, transfer_id).await?;
        require_direction(&transfer, TransferDirection::Outbound)?;

        let outcome = lifecycle::apply(
            transfer.direction.clone().into(),
            TransferAction::Update,
            transfer.status.clone().into(),
            transfer.remittance_status.clone().into(),
        )?;

        let amount = input.amount.unwrap_or(transfer.amount);

        let beneficiary_id = match input.beneficiary_id {
            Some(id) => {
                let beneficiary = beneficiaries::Entity::find_by_id(id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| TransferError::NotFound(format!("beneficiary {id}")))?;
                if beneficiary.customer_id != transfer.customer_id {
                    return Err(TransferError::Business(
                        "beneficiary does not belong to the customer".into(),
                    ));
                }
                id
            }
            None => transfer.beneficiary_id,
        };

        let existing_charges = transfer_charges::Entity::find()
            .filter(transfer_charges::Column::TransferId.eq(transfer_id))
            .all(&txn)
            .await?;

        let definitions = load_charge_definitions(&txn).await?;
        let negotiated = match &input.negotiated_rates {
            Some(rates) => negotiated_map(rates),
            None => carry_negotiated(&existing_charges, &definitions),
        };

        let cascade = charge::calculate(
            amount,
            transfer.currency_id,
            transfer.origin_org_id,
            transfer.dest_org_id,
            &definitions,
            &negotiated,
        )?;
        let amount_payable = amount + cascade.total_charges;

        if amount != transfer.amount {
            let org_balance = self
                .float_ledger
                .find_locked(
                    &txn,
                    self.platform_org_id,
                    transfer.origin_org_id,
                    transfer.currency_id,
                )
                .await?
                .ok_or_else(|| {
                    TransferError::Business("origin agency must deposit float first".into())
                })?;
            let available = org_balance.balance - org_balance.locked_balance;
            if available < amount_payable {
                return Err(TransferError::InsufficientFunds {
                    available,
                    requested: amount_payable,
                });
            }
        }

        commission_splits::Entity::delete_many()
            .filter(commission_splits::Column::TransferId.eq(transfer_id))
            .exec(&txn)
            .await?;
        transfer_charges::Entity::delete_many()
            .filter(transfer_charges::Column::TransferId.eq(transfer_id))
            .exec(&txn)
            .await?;
        persist_cascade(
            &txn,
            transfer_id,
            &cascade,
            self.platform_org_id,
            transfer.origin_org_id,
            transfer.dest_org_id,
        )
        .await?;

        let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
        update.amount = Set(amount);
        update.beneficiary_id = Set(beneficiary_id);
        update.total_commissions = Set(cascade.total_commissions);
        update.total_taxes = Set(cascade.total_taxes);
        update.total_all_charges = Set(cascade.total_charges);
        update.amount_payable = Set(amount_payable);
        if let Some(notes) = input.notes {
            update.notes = Set(Some(notes));
        }
        cas_update(&txn, transfer_id, &transfer.status, update).await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::Updated,
            Some(transfer.status.clone()),
            TransferStatus::from(outcome.status),
            None,
            actor,
        )
        .await?;

        txn.commit().await?;
        self.get_with_charges(transfer_id).await
    }

    /// Cancels a transfer before approval.
    ///
    /// All its charge rows flip to REJECTED (splits too). Nothing was ever
    /// locked or moved, so there is no balance or GL impact.
    ///
    /// # Errors
    ///
    /// [`TransferError::Lifecycle`] outside PENDING/PENDING_APPROVAL/READY
    /// or once funds are in transit.
    pub async fn cancel(
        &self,
        transfer_id: Uuid,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let txn = self.db.begin().await?;
        let transfer = load_transfer_locked(&txn, transfer_id).await?;

        let outcome = lifecycle::apply(
            transfer.direction.clone().into(),
            TransferAction::Cancel,
            transfer.status.clone().into(),
            transfer.remittance_status.clone().into(),
        )?;

        set_charge_statuses(
            &txn,
            transfer_id,
            TransferChargeStatus::Rejected,
            SplitStatus::Rejected,
        )
        .await?;

        let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
        update.status = Set(TransferStatus::from(outcome.status));
        update.request_status = Set(RequestStatus::from(outcome.request));
        cas_update(&txn, transfer_id, &transfer.status, update).await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::Cancelled,
            Some(transfer.status.clone()),
            TransferStatus::from(outcome.status),
            None,
            actor,
        )
        .await?;

        txn.commit().await?;
        info!(transfer_id = %transfer_id, "transfer cancelled");
        self.get_with_charges(transfer_id).await
    }

    /// Reverses an approved outbound transfer whose funds never left.
    ///
    /// Unlocks the reserved float, reverses the till cash movement, posts
    /// the offsetting GL transaction, and marks reversible charge rows
    /// REVERSED. Non-reversible charges are left untouched.
    ///
    /// # Errors
    ///
    /// [`TransferError::Lifecycle`] unless APPROVED with remittance PENDING.
    pub async fn reverse_outbound(
        &self,
        transfer_id: Uuid,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let txn = self.db.begin().await?;
        let transfer = load_transfer_locked(&txn, transfer_id).await?;
        require_direction(&transfer, TransferDirection::Outbound)?;

        let outcome = lifecycle::apply(
            transfer.direction.clone().into(),
            TransferAction::Reverse,
            transfer.status.clone().into(),
            transfer.remittance_status.clone().into(),
        )?;

        let org_balance = self
            .float_ledger
            .find_locked(
                &txn,
                self.platform_org_id,
                transfer.origin_org_id,
                transfer.currency_id,
            )
            .await?
            .ok_or_else(|| {
                TransferError::Business("origin float is missing for reversal".into())
            })?;
        self.float_ledger
            .unlock(
                &txn,
                &org_balance,
                transfer.amount_payable,
                &format!("Unlock on reversal of transfer {}", transfer.number),
                actor,
            )
            .await?;

        let session_id = transfer.till_session_id.ok_or_else(|| {
            TransferError::Business("transfer has no till session to reverse against".into())
        })?;
        let (_session, till) = self.tills.find_with_till(&txn, session_id).await?;
        self.custody
            .apply_signed_change(
                &txn,
                till.id,
                -transfer.amount_payable,
                false,
                BalanceAction::CashOut,
                &format!("Cash returned on reversal of transfer {}", transfer.number),
                actor,
            )
            .await?;

        for posting in self.gl.find_postings_for_transfer(&txn, transfer_id).await? {
            self.gl.reverse(&txn, posting.id).await?;
        }

        reverse_reversible_charges(&txn, transfer_id).await?;

        let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
        update.status = Set(TransferStatus::from(outcome.status));
        update.request_status = Set(RequestStatus::from(outcome.request));
        cas_update(&txn, transfer_id, &transfer.status, update).await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::Reversed,
            Some(transfer.status.clone()),
            TransferStatus::from(outcome.status),
            None,
            actor,
        )
        .await?;

        txn.commit().await?;
        info!(transfer_id = %transfer_id, "outbound transfer reversed");
        self.get_with_charges(transfer_id).await
    }

    /// Approves (pays out) an inbound transfer.
    ///
    /// Settles both floats (debit origin, credit destination), releases the
    /// linked outbound's lock, moves cash into the destination till, posts
    /// the settlement GL transactions, and flips the linked outbound to
    /// COMPLETED. Periodic accumulator updates are applied after the
    /// primary transaction commits; their failure is logged, never
    /// propagated.
    ///
    /// # Errors
    ///
    /// - [`TransferError::Lifecycle`] when the status does not allow approval
    /// - [`TransferError::InsufficientFunds`] when the origin float cannot
    ///   cover the settlement (defense in depth)
    pub async fn approve_inbound(
        &self,
        transfer_id: Uuid,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let acting_user = require_user(actor)?;
        let require_open_till = self.require_open_till().await?;

        let txn = self.db.begin().await?;
        let transfer = load_transfer_locked(&txn, transfer_id).await?;
        require_direction(&transfer, TransferDirection::Inbound)?;

        let outcome = lifecycle::apply(
            transfer.direction.clone().into(),
            TransferAction::Approve,
            transfer.status.clone().into(),
            transfer.remittance_status.clone().into(),
        )?;

        let linked = match transfer.linked_transfer_id {
            Some(linked_id) => Some(load_transfer_locked(&txn, linked_id).await?),
            None => None,
        };

        let org_balance_origin = self
            .float_ledger
            .find_locked(
                &txn,
                self.platform_org_id,
                transfer.origin_org_id,
                transfer.currency_id,
            )
            .await?
            .ok_or_else(|| {
                TransferError::Business("origin float is missing for settlement".into())
            })?;

        // Float may have moved since outbound approval; check what will be
        // available once the linked lock is released.
        let locked_for_this = linked.as_ref().map_or(Decimal::ZERO, |l| l.amount_payable);
        let effective_available =
            org_balance_origin.balance - org_balance_origin.locked_balance + locked_for_this;
        if effective_available < transfer.amount {
            return Err(TransferError::InsufficientFunds {
                available: effective_available,
                requested: transfer.amount,
            });
        }

        if let Some(linked_transfer) = &linked {
            self.float_ledger
                .unlock(
                    &txn,
                    &org_balance_origin,
                    linked_transfer.amount_payable,
                    &format!("Release lock on settlement of transfer {}", transfer.number),
                    actor,
                )
                .await?;
        }

        // Re-read after the unlock so the settle check sees fresh numbers.
        let org_balance_origin = self
            .float_ledger
            .find_locked(
                &txn,
                self.platform_org_id,
                transfer.origin_org_id,
                transfer.currency_id,
            )
            .await?
            .ok_or_else(|| {
                TransferError::Business("origin float is missing for settlement".into())
            })?;
        self.float_ledger
            .settle(
                &txn,
                &org_balance_origin,
                -transfer.amount,
                &format!("Settlement debit for transfer {}", transfer.number),
                actor,
            )
            .await?;

        let org_balance_dest = self
            .float_ledger
            .get_or_create(
                &txn,
                self.platform_org_id,
                transfer.dest_org_id,
                transfer.currency_id,
            )
            .await?;
        self.float_ledger
            .settle(
                &txn,
                &org_balance_dest,
                transfer.amount,
                &format!("Settlement credit for transfer {}", transfer.number),
                actor,
            )
            .await?;

        let (session, till) = self
            .tills
            .resolve_open_session(&txn, transfer.dest_org_id, acting_user, require_open_till)
            .await?;
        self.custody
            .apply_signed_change(
                &txn,
                till.id,
                transfer.amount,
                true,
                BalanceAction::CashIn,
                &format!("Payout float for transfer {}", transfer.number),
                actor,
            )
            .await?;

        self.post_settlement_gl(
            &txn,
            &transfer,
            org_balance_origin.id,
            till.id,
        )
        .await?;

        // Commission becomes real on settlement.
        let (origin_commission, dest_commission) = match &linked {
            Some(linked_transfer) => {
                settle_commission_splits(&txn, linked_transfer.id).await?
            }
            None => (Decimal::ZERO, Decimal::ZERO),
        };

        if let Some(linked_transfer) = &linked {
            let linked_outcome = lifecycle::apply(
                linked_transfer.direction.clone().into(),
                TransferAction::Complete,
                linked_transfer.status.clone().into(),
                linked_transfer.remittance_status.clone().into(),
            )?;
            let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
            update.status = Set(TransferStatus::from(linked_outcome.status));
            if let Some(remittance) = linked_outcome.remittance {
                update.remittance_status = Set(RemittanceStatus::from(remittance));
            }
            update.request_status = Set(RequestStatus::from(linked_outcome.request));
            cas_update(&txn, linked_transfer.id, &linked_transfer.status, update).await?;
            write_audit(
                &txn,
                linked_transfer.id,
                AuditAction::Updated,
                Some(linked_transfer.status.clone()),
                TransferStatus::from(linked_outcome.status),
                Some("Completed by inbound settlement".into()),
                actor,
            )
            .await?;
        }

        let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
        update.status = Set(TransferStatus::from(outcome.status));
        if let Some(remittance) = outcome.remittance {
            update.remittance_status = Set(RemittanceStatus::from(remittance));
        }
        update.request_status = Set(RequestStatus::from(outcome.request));
        update.till_session_id = Set(Some(session.id));
        cas_update(&txn, transfer_id, &transfer.status, update).await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::Approved,
            Some(transfer.status.clone()),
            TransferStatus::from(outcome.status),
            None,
            actor,
        )
        .await?;

        txn.commit().await?;
        info!(
            transfer_id = %transfer_id,
            number = %transfer.number,
            amount = %transfer.amount,
            "inbound transfer paid out"
        );

        // Periodic accumulators run outside the committed payout; a glitch
        // here must never roll it back.
        self.apply_settlement_accumulators(
            org_balance_origin.id,
            org_balance_dest.id,
            transfer.amount,
            origin_commission,
            dest_commission,
        )
        .await;

        self.get_with_charges(transfer_id).await
    }

    /// Reverses an approved inbound transfer.
    ///
    /// Reverses the destination till cash and the settlement GL postings.
    /// The origin float's settlement debit is NOT re-credited: once paid
    /// out, the funds have irrevocably left the float.
    ///
    /// # Errors
    ///
    /// [`TransferError::Lifecycle`] unless the inbound is APPROVED (or
    /// COMPLETED).
    pub async fn reverse_inbound(
        &self,
        transfer_id: Uuid,
        actor: &Actor,
    ) -> Result<TransferWithCharges, TransferError> {
        let txn = self.db.begin().await?;
        let transfer = load_transfer_locked(&txn, transfer_id).await?;
        require_direction(&transfer, TransferDirection::Inbound)?;

        let outcome = lifecycle::apply(
            transfer.direction.clone().into(),
            TransferAction::Reverse,
            transfer.status.clone().into(),
            transfer.remittance_status.clone().into(),
        )?;

        let session_id = transfer.till_session_id.ok_or_else(|| {
            TransferError::Business("transfer has no till session to reverse against".into())
        })?;
        let (_session, till) = self.tills.find_with_till(&txn, session_id).await?;
        self.custody
            .apply_signed_change(
                &txn,
                till.id,
                -transfer.amount,
                false,
                BalanceAction::CashOut,
                &format!("Payout reversed for transfer {}", transfer.number),
                actor,
            )
            .await?;

        for posting in self.gl.find_postings_for_transfer(&txn, transfer_id).await? {
            self.gl.reverse(&txn, posting.id).await?;
        }

        let mut update = <transfers::ActiveModel as sea_orm::ActiveModelTrait>::default();
        update.status = Set(TransferStatus::from(outcome.status));
        update.request_status = Set(RequestStatus::from(outcome.request));
        cas_update(&txn, transfer_id, &transfer.status, update).await?;

        write_audit(
            &txn,
            transfer_id,
            AuditAction::Reversed,
            Some(transfer.status.clone()),
            TransferStatus::from(outcome.status),
            None,
            actor,
        )
        .await?;

        txn.commit().await?;
        info!(transfer_id = %transfer_id, "inbound transfer reversed");
        self.get_with_charges(transfer_id).await
    }

    /// Lists transfers matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: TransferFilter,
    ) -> Result<Vec<transfers::Model>, TransferError> {
        let mut query = transfers::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(transfers::Column::Status.eq(status));
        }
        if let Some(direction) = filter.direction {
            query = query.filter(transfers::Column::Direction.eq(direction));
        }
        if let Some(origin_org_id) = filter.origin_org_id {
            query = query.filter(transfers::Column::OriginOrgId.eq(origin_org_id));
        }
        if let Some(dest_org_id) = filter.dest_org_id {
            query = query.filter(transfers::Column::DestOrgId.eq(dest_org_id));
        }

        Ok(query
            .order_by_desc(transfers::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Gets a transfer with its charges.
    ///
    /// # Errors
    ///
    /// [`TransferError::NotFound`] when the transfer does not exist.
    pub async fn get_with_charges(
        &self,
        transfer_id: Uuid,
    ) -> Result<TransferWithCharges, TransferError> {
        let transfer = transfers::Entity::find_by_id(transfer_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| TransferError::NotFound(format!("transfer {transfer_id}")))?;

        let charges = transfer_charges::Entity::find()
            .filter(transfer_charges::Column::TransferId.eq(transfer_id))
            .all(&self.db)
            .await?;

        Ok(TransferWithCharges { transfer, charges })
    }

    /// Creates the mirrored inbound transfer for an internal destination.
    async fn create_inbound_mirror(
        &self,
        txn: &DatabaseTransaction,
        outbound: &transfers::Model,
        acting_user: Uuid,
        actor: &Actor,
    ) -> Result<transfers::Model, TransferError> {
        let existing = transfers::Entity::find()
            .filter(transfers::Column::Direction.eq(TransferDirection::Inbound))
            .filter(transfers::Column::LinkedTransferId.eq(outbound.id))
            .filter(transfers::Column::Number.eq(outbound.number.clone()))
            .one(txn)
            .await?;
        if existing.is_some() {
            return Err(TransferError::Conflict(format!(
                "an inbound transfer already references outbound {} ({})",
                outbound.id, outbound.number
            )));
        }

        let now = Utc::now();
        let mirror_id = Uuid::new_v4();
        let row = transfers::ActiveModel {
            id: Set(mirror_id),
            number: Set(outbound.number.clone()),
            direction: Set(TransferDirection::Inbound),
            origin_org_id: Set(outbound.origin_org_id),
            dest_org_id: Set(outbound.dest_org_id),
            corridor_id: Set(outbound.corridor_id),
            customer_id: Set(outbound.customer_id),
            beneficiary_id: Set(outbound.beneficiary_id),
            currency_id: Set(outbound.currency_id),
            amount: Set(outbound.amount),
            total_commissions: Set(Decimal::ZERO),
            total_taxes: Set(Decimal::ZERO),
            total_all_charges: Set(Decimal::ZERO),
            amount_payable: Set(outbound.amount),
            status: Set(TransferStatus::PendingApproval),
            remittance_status: Set(RemittanceStatus::Transit),
            request_status: Set(RequestStatus::Pending),
            till_session_id: Set(None),
            assigned_user_id: Set(None),
            linked_transfer_id: Set(Some(outbound.id)),
            notes: Set(None),
            created_by: Set(Some(acting_user)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let mirror = row.insert(txn).await?;

        write_audit(
            txn,
            mirror_id,
            AuditAction::Created,
            None,
            TransferStatus::PendingApproval,
            Some(format!("Mirror of outbound transfer {}", outbound.number)),
            actor,
        )
        .await?;

        info!(
            outbound_id = %outbound.id,
            inbound_id = %mirror_id,
            "inbound mirror created"
        );
        Ok(mirror)
    }

    /// Posts the approval GL transaction on the origin books.
    ///
    /// DR till cash for the full payable; CR float payable for the
    /// principal; CR one revenue leg per charge. A charge leg without a
    /// configured account folds into the float-payable leg so the posting
    /// stays balanced; without till or float mappings the GL step is
    /// skipped entirely.
    async fn post_approval_gl(
        &self,
        txn: &DatabaseTransaction,
        transfer: &transfers::Model,
        org_balance_id: Uuid,
        till_account_id: Uuid,
        active_charges: &[transfer_charges::Model],
    ) -> Result<(), TransferError> {
        let till_account = self
            .gl
            .resolve_account_for_entity(
                txn,
                GlEntityKind::CustodyAccount,
                till_account_id,
                transfer.origin_org_id,
            )
            .await?;
        let float_account = self
            .gl
            .resolve_account_for_entity(
                txn,
                GlEntityKind::OrgBalance,
                org_balance_id,
                transfer.origin_org_id,
            )
            .await?;

        let (Some(till_account), Some(float_account)) = (till_account, float_account) else {
            warn!(
                transfer_id = %transfer.id,
                "till or float GL account not configured, skipping approval posting"
            );
            return Ok(());
        };

        let mut float_leg = transfer.amount;
        let mut entries = vec![GlEntryInput {
            account_id: till_account,
            side: EntrySide::Debit,
            amount: transfer.amount_payable,
            memo: Some("Till cash".into()),
        }];

        for charge_row in active_charges {
            match self
                .gl
                .resolve_account_for_entity(
                    txn,
                    GlEntityKind::Charge,
                    charge_row.charge_id,
                    transfer.origin_org_id,
                )
                .await?
            {
                Some(account_id) => entries.push(GlEntryInput {
                    account_id,
                    side: EntrySide::Credit,
                    amount: charge_row.amount,
                    memo: Some(charge_row.name.clone()),
                }),
                None => {
                    warn!(
                        charge_id = %charge_row.charge_id,
                        "no revenue account for charge, folding into float payable leg"
                    );
                    float_leg += charge_row.amount;
                }
            }
        }

        entries.push(GlEntryInput {
            account_id: float_account,
            side: EntrySide::Credit,
            amount: float_leg,
            memo: Some("Float payable".into()),
        });

        self.gl
            .post(
                txn,
                transfer.origin_org_id,
                Some(transfer.id),
                &format!("Approval of transfer {}", transfer.number),
                &entries,
            )
            .await?;
        Ok(())
    }

    /// Posts the settlement GL transactions: payout on the destination
    /// books, float release on the origin books. Either posting is skipped
    /// (with a warning) when its accounts are not configured.
    async fn post_settlement_gl(
        &self,
        txn: &DatabaseTransaction,
        transfer: &transfers::Model,
        org_balance_origin_id: Uuid,
        till_account_id: Uuid,
    ) -> Result<(), TransferError> {
        let till_account = self
            .gl
            .resolve_account_for_entity(
                txn,
                GlEntityKind::CustodyAccount,
                till_account_id,
                transfer.dest_org_id,
            )
            .await?;
        let payable_account = self
            .gl
            .resolve_account_by_code(txn, transfer.dest_org_id, ACCOUNT_BENEFICIARY_PAYABLE)
            .await?;

        if let (Some(till_account), Some(payable_account)) = (till_account, payable_account) {
            self.gl
                .post(
                    txn,
                    transfer.dest_org_id,
                    Some(transfer.id),
                    &format!("Payout of transfer {}", transfer.number),
                    &[
                        GlEntryInput {
                            account_id: till_account,
                            side: EntrySide::Debit,
                            amount: transfer.amount,
                            memo: Some("Till cash".into()),
                        },
                        GlEntryInput {
                            account_id: payable_account,
                            side: EntrySide::Credit,
                            amount: transfer.amount,
                            memo: Some("Payable to beneficiary".into()),
                        },
                    ],
                )
                .await?;
        } else {
            warn!(
                transfer_id = %transfer.id,
                "destination GL accounts not configured, skipping payout posting"
            );
        }

        let float_account = self
            .gl
            .resolve_account_for_entity(
                txn,
                GlEntityKind::OrgBalance,
                org_balance_origin_id,
                transfer.origin_org_id,
            )
            .await?;
        let transit_account = self
            .gl
            .resolve_account_by_code(txn, transfer.origin_org_id, ACCOUNT_FLOAT_TRANSIT)
            .await?;

        if let (Some(float_account), Some(transit_account)) = (float_account, transit_account) {
            self.gl
                .post(
                    txn,
                    transfer.origin_org_id,
                    Some(transfer.id),
                    &format!("Float settlement of transfer {}", transfer.number),
                    &[
                        GlEntryInput {
                            account_id: float_account,
                            side: EntrySide::Debit,
                            amount: transfer.amount,
                            memo: Some("Float payable released".into()),
                        },
                        GlEntryInput {
                            account_id: transit_account,
                            side: EntrySide::Credit,
                            amount: transfer.amount,
                            memo: Some("Float in transit".into()),
                        },
                    ],
                )
                .await?;
        } else {
            warn!(
                transfer_id = %transfer.id,
                "origin GL accounts not configured, skipping float settlement posting"
            );
        }

        Ok(())
    }

    /// Applies the periodic accumulators after a committed settlement,
    /// tolerating and logging failures.
    async fn apply_settlement_accumulators(
        &self,
        org_balance_origin_id: Uuid,
        org_balance_dest_id: Uuid,
        amount: Decimal,
        origin_commission: Decimal,
        dest_commission: Decimal,
    ) {
        let updates = [
            (org_balance_origin_id, AccumulatorKind::TransactionOut, amount),
            (org_balance_dest_id, AccumulatorKind::TransactionIn, amount),
            (
                org_balance_origin_id,
                AccumulatorKind::Commission,
                origin_commission,
            ),
            (
                org_balance_dest_id,
                AccumulatorKind::Commission,
                dest_commission,
            ),
        ];

        for (org_balance_id, kind, value) in updates {
            if value <= Decimal::ZERO {
                continue;
            }
            if let Err(err) = self
                .float_ledger
                .accumulate_standalone(org_balance_id, kind, value)
                .await
            {
                warn!(
                    org_balance_id = %org_balance_id,
                    ?kind,
                    %value,
                    error = %err,
                    "periodic accumulator update failed after settlement"
                );
            }
        }
    }
}

/// Requires an acting user on the actor.
fn require_user(actor: &Actor) -> Result<Uuid, TransferError> {
    actor
        .user_id
        .ok_or_else(|| TransferError::Business("operation requires an acting user".into()))
}

/// Loads a transfer row `FOR UPDATE`.
async fn load_transfer_locked(
    txn: &DatabaseTransaction,
    transfer_id: Uuid,
) -> Result<transfers::Model, TransferError> {
    transfers::Entity::find_by_id(transfer_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| TransferError::NotFound(format!("transfer {transfer_id}")))
}

/// Guards a direction-specific operation.
fn require_direction(
    transfer: &transfers::Model,
    expected: TransferDirection,
) -> Result<(), TransferError> {
    if transfer.direction == expected {
        Ok(())
    } else {
        Err(TransferError::Business(format!(
            "operation applies to {expected:?} transfers only"
        )))
    }
}

/// Compare-and-swap update: only applies while the status is unchanged.
async fn cas_update(
    txn: &DatabaseTransaction,
    transfer_id: Uuid,
    expected_status: &TransferStatus,
    mut update: transfers::ActiveModel,
) -> Result<(), TransferError> {
    update.updated_at = Set(Utc::now().into());
    let result = transfers::Entity::update_many()
        .set(update)
        .filter(transfers::Column::Id.eq(transfer_id))
        .filter(transfers::Column::Status.eq(expected_status.clone()))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(TransferError::Conflict(format!(
            "transfer {transfer_id} was modified concurrently"
        )));
    }
    Ok(())
}

/// Appends a transfer audit row.
async fn write_audit(
    txn: &DatabaseTransaction,
    transfer_id: Uuid,
    action: AuditAction,
    status_before: Option<TransferStatus>,
    status_after: TransferStatus,
    notes: Option<String>,
    actor: &Actor,
) -> Result<(), DbErr> {
    let row = transfer_audits::ActiveModel {
        id: Set(Uuid::new_v4()),
        transfer_id: Set(transfer_id),
        action: Set(action),
        status_before: Set(status_before),
        status_after: Set(status_after),
        notes: Set(notes),
        actor_id: Set(actor.user_id),
        actor_ip: Set(actor.ip.clone()),
        created_at: Set(Utc::now().into()),
    };
    row.insert(txn).await?;
    Ok(())
}

/// Loads all active charge definitions as core types.
async fn load_charge_definitions(
    txn: &DatabaseTransaction,
) -> Result<Vec<ChargeDefinition>, DbErr> {
    let rows = charges::Entity::find()
        .filter(charges::Column::Active.eq(true))
        .all(txn)
        .await?;
    Ok(rows.iter().map(to_core_definition).collect())
}

/// Maps a charge row to the pure definition the calculator consumes.
fn to_core_definition(model: &charges::Model) -> ChargeDefinition {
    use crate::entities::sea_orm_active_enums::RateKind;

    ChargeDefinition {
        id: model.id,
        name: model.name.clone(),
        kind: model.kind.clone().into(),
        rate: match model.rate_kind {
            RateKind::Percentage => RateSpec::Percentage(model.rate_value),
            RateKind::Flat => RateSpec::Flat(model.rate_value),
        },
        min_amount: model.min_amount,
        max_amount: model.max_amount,
        currency_id: model.currency_id,
        origin_org_id: model.origin_org_id,
        dest_org_id: model.dest_org_id,
        shares: ShareSplit {
            internal: model.internal_share,
            origin: model.origin_share,
            destination: model.destination_share,
        },
        reversible: model.reversible,
        active: model.active,
    }
}

/// Builds the negotiated-rate override map.
fn negotiated_map(rates: &[NegotiatedRate]) -> HashMap<Uuid, RateSpec> {
    rates.iter().map(|n| (n.charge_id, n.rate)).collect()
}

/// Re-derives the negotiated map from persisted charge rows, typed by the
/// definition's own rate kind.
fn carry_negotiated(
    existing: &[transfer_charges::Model],
    definitions: &[ChargeDefinition],
) -> HashMap<Uuid, RateSpec> {
    existing
        .iter()
        .filter_map(|row| {
            let value = row.negotiated_rate?;
            let definition = definitions.iter().find(|d| d.id == row.charge_id)?;
            let rate = match definition.rate {
                RateSpec::Percentage(_) => RateSpec::Percentage(value),
                RateSpec::Flat(_) => RateSpec::Flat(value),
            };
            Some((row.charge_id, rate))
        })
        .collect()
}

/// The plain value of a rate, for persistence.
fn rate_value(rate: RateSpec) -> Decimal {
    match rate {
        RateSpec::Percentage(value) | RateSpec::Flat(value) => value,
    }
}

/// Generates a transfer number.
fn generate_number() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("TRF-{}", &id[..12])
}

/// Persists the cascade as transfer_charges + commission_splits rows.
async fn persist_cascade(
    txn: &DatabaseTransaction,
    transfer_id: Uuid,
    cascade: &ChargeCascade,
    platform_org_id: Uuid,
    origin_org_id: Uuid,
    dest_org_id: Uuid,
) -> Result<Vec<transfer_charges::Model>, DbErr> {
    let now = Utc::now();
    let mut rows = Vec::with_capacity(cascade.charges.len());

    for computed in &cascade.charges {
        let charge_row_id = Uuid::new_v4();
        let row = transfer_charges::ActiveModel {
            id: Set(charge_row_id),
            transfer_id: Set(transfer_id),
            charge_id: Set(computed.charge_id),
            kind: Set(computed.kind.into()),
            name: Set(computed.name.clone()),
            amount: Set(computed.amount),
            negotiated_rate: Set(computed.negotiated.then(|| rate_value(computed.rate_applied))),
            internal_share: Set(computed.shares.internal),
            origin_share: Set(computed.shares.origin),
            destination_share: Set(computed.shares.destination),
            reversible: Set(computed.reversible),
            status: Set(TransferChargeStatus::Active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        rows.push(row.insert(txn).await?);

        if computed.kind == charge::ChargeKind::Commission {
            let splits = [
                (SplitRole::Internal, platform_org_id, computed.shares.internal),
                (SplitRole::Origin, origin_org_id, computed.shares.origin),
                (
                    SplitRole::Destination,
                    dest_org_id,
                    computed.shares.destination,
                ),
            ];
            for (role, organization_id, amount) in splits {
                let split = commission_splits::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    transfer_charge_id: Set(charge_row_id),
                    transfer_id: Set(transfer_id),
                    role: Set(role),
                    organization_id: Set(Some(organization_id)),
                    amount: Set(amount),
                    status: Set(SplitStatus::Pending),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                split.insert(txn).await?;
            }
        }
    }

    Ok(rows)
}

/// Flips all charge rows (and their splits) to the given statuses.
async fn set_charge_statuses(
    txn: &DatabaseTransaction,
    transfer_id: Uuid,
    charge_status: TransferChargeStatus,
    split_status: SplitStatus,
) -> Result<(), DbErr> {
    let now = Utc::now();

    let mut charge_update = <transfer_charges::ActiveModel as sea_orm::ActiveModelTrait>::default();
    charge_update.status = Set(charge_status);
    charge_update.updated_at = Set(now.into());
    transfer_charges::Entity::update_many()
        .set(charge_update)
        .filter(transfer_charges::Column::TransferId.eq(transfer_id))
        .filter(transfer_charges::Column::Status.eq(TransferChargeStatus::Active))
        .exec(txn)
        .await?;

    let mut split_update = <commission_splits::ActiveModel as sea_orm::ActiveModelTrait>::default();
    split_update.status = Set(split_status);
    split_update.updated_at = Set(now.into());
    commission_splits::Entity::update_many()
        .set(split_update)
        .filter(commission_splits::Column::TransferId.eq(transfer_id))
        .filter(commission_splits::Column::Status.eq(SplitStatus::Pending))
        .exec(txn)
        .await?;

    Ok(())
}

/// Marks reversible charge rows REVERSED; non-reversible ones are left
/// untouched, so `total_all_charges` may exceed the sum of non-rejected
/// rows on a reversed transfer.
async fn reverse_reversible_charges(
    txn: &DatabaseTransaction,
    transfer_id: Uuid,
) -> Result<(), DbErr> {
    let reversible = transfer_charges::Entity::find()
        .filter(transfer_charges::Column::TransferId.eq(transfer_id))
        .filter(transfer_charges::Column::Status.eq(TransferChargeStatus::Active))
        .filter(transfer_charges::Column::Reversible.eq(true))
        .all(txn)
        .await?;

    let now = Utc::now();
    for row in reversible {
        let charge_row_id = row.id;
        let mut active: transfer_charges::ActiveModel = row.into();
        active.status = Set(TransferChargeStatus::Reversed);
        active.updated_at = Set(now.into());
        active.update(txn).await?;

        let mut split_update = <commission_splits::ActiveModel as sea_orm::ActiveModelTrait>::default();
        split_update.status = Set(SplitStatus::Reversed);
        split_update.updated_at = Set(now.into());
        commission_splits::Entity::update_many()
            .set(split_update)
            .filter(commission_splits::Column::TransferChargeId.eq(charge_row_id))
            .filter(commission_splits::Column::Status.eq(SplitStatus::Pending))
            .exec(txn)
            .await?;
    }

    Ok(())
}

/// Marks the commission splits of a transfer SETTLED and returns the
/// (origin, destination) commission share totals for the accumulators.
async fn settle_commission_splits(
    txn: &DatabaseTransaction,
    transfer_id: Uuid,
) -> Result<(Decimal, Decimal), DbErr> {
    let splits = commission_splits::Entity::find()
        .filter(commission_splits::Column::TransferId.eq(transfer_id))
        .filter(commission_splits::Column::Status.eq(SplitStatus::Pending))
        .all(txn)
        .await?;

    let now = Utc::now();
    let mut origin_total = Decimal::ZERO;
    let mut dest_total = Decimal::ZERO;

    for split in splits {
        match split.role {
            SplitRole::Origin => origin_total += split.amount,
            SplitRole::Destination => dest_total += split.amount,
            SplitRole::Internal => {}
        }
        let mut active: commission_splits::ActiveModel = split.into();
        active.status = Set(SplitStatus::Settled);
        active.updated_at = Set(now.into());
        active.update(txn).await?;
    }

    Ok((origin_total, dest_total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_generate_number_shape() {
        let number = generate_number();
        assert!(number.starts_with("TRF-"));
        assert_eq!(number.len(), 16);
        assert!(number[4..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_number_unique() {
        assert_ne!(generate_number(), generate_number());
    }

    #[test]
    fn test_rate_value_extracts_both_kinds() {
        assert_eq!(rate_value(RateSpec::Percentage(dec!(2.5))), dec!(2.5));
        assert_eq!(rate_value(RateSpec::Flat(dec!(7))), dec!(7));
    }

    #[test]
    fn test_negotiated_map() {
        let charge_id = Uuid::new_v4();
        let map = negotiated_map(&[NegotiatedRate {
            charge_id,
            rate: RateSpec::Percentage(dec!(1)),
        }]);
        assert_eq!(map.len(), 1);
        assert!(matches!(map[&charge_id], RateSpec::Percentage(v) if v == dec!(1)));
    }
}
