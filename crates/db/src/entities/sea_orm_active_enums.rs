//! `SeaORM` active enums mirroring the Postgres enum types.
//!
//! Conversions to/from the pure `remvio-core` enums live here so the
//! repositories can hand rows straight to the state machine and the charge
//! calculator.

use remvio_core::charge;
use remvio_core::ledger;
use remvio_core::lifecycle;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organisation status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "org_status")]
pub enum OrgStatus {
    /// Participating in transfers and period closes.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Suspended.
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
}

/// How a destination organisation is integrated.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "integration_kind")]
pub enum IntegrationKind {
    /// Runs on this platform; inbound mirrors are created synchronously.
    #[sea_orm(string_value = "internal")]
    Internal,
    /// External partner; settlement happens out of band.
    #[sea_orm(string_value = "external")]
    External,
}

/// Corridor status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "corridor_status")]
pub enum CorridorStatus {
    /// Open for new transfers.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Closed.
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
}

/// Kind of custody account.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "custody_kind")]
pub enum CustodyKind {
    /// Bank account.
    #[sea_orm(string_value = "bank_account")]
    BankAccount,
    /// Cash vault.
    #[sea_orm(string_value = "vault")]
    Vault,
    /// Teller till.
    #[sea_orm(string_value = "till")]
    Till,
}

/// Polymorphic target of a balance history row.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "balance_entity_kind")]
pub enum BalanceEntityKind {
    /// Bank account balance.
    #[sea_orm(string_value = "bank_account")]
    BankAccount,
    /// Vault balance.
    #[sea_orm(string_value = "vault")]
    Vault,
    /// Till balance.
    #[sea_orm(string_value = "till")]
    Till,
    /// Organisation float balance.
    #[sea_orm(string_value = "org_balance")]
    OrgBalance,
}

impl From<CustodyKind> for BalanceEntityKind {
    fn from(kind: CustodyKind) -> Self {
        match kind {
            CustodyKind::BankAccount => Self::BankAccount,
            CustodyKind::Vault => Self::Vault,
            CustodyKind::Till => Self::Till,
        }
    }
}

/// GL account classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gl_account_type")]
pub enum GlAccountType {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Entity kinds a GL account can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gl_entity_kind")]
pub enum GlEntityKind {
    /// Custody account binding.
    #[sea_orm(string_value = "custody_account")]
    CustodyAccount,
    /// Organisation float binding.
    #[sea_orm(string_value = "org_balance")]
    OrgBalance,
    /// Charge definition binding.
    #[sea_orm(string_value = "charge")]
    Charge,
}

impl From<ledger::GlEntityKind> for GlEntityKind {
    fn from(kind: ledger::GlEntityKind) -> Self {
        match kind {
            ledger::GlEntityKind::CustodyAccount => Self::CustodyAccount,
            ledger::GlEntityKind::OrgBalance => Self::OrgBalance,
            ledger::GlEntityKind::Charge => Self::Charge,
        }
    }
}

/// Side of a GL entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_side")]
pub enum EntrySide {
    /// Debit.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit.
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<ledger::EntrySide> for EntrySide {
    fn from(side: ledger::EntrySide) -> Self {
        match side {
            ledger::EntrySide::Debit => Self::Debit,
            ledger::EntrySide::Credit => Self::Credit,
        }
    }
}

impl From<EntrySide> for ledger::EntrySide {
    fn from(side: EntrySide) -> Self {
        match side {
            EntrySide::Debit => Self::Debit,
            EntrySide::Credit => Self::Credit,
        }
    }
}

/// GL transaction status. Only POSTED is produced by this engine's write
/// path; DRAFT exists for imported journals.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gl_transaction_status")]
pub enum GlTransactionStatus {
    /// Not yet posted.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Posted; balances applied.
    #[sea_orm(string_value = "POSTED")]
    Posted,
}

/// Charge classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "charge_kind")]
pub enum ChargeKind {
    /// Shared commission.
    #[sea_orm(string_value = "commission")]
    Commission,
    /// Platform fee.
    #[sea_orm(string_value = "fee")]
    Fee,
    /// Tax on fees.
    #[sea_orm(string_value = "tax")]
    Tax,
}

impl From<ChargeKind> for charge::ChargeKind {
    fn from(kind: ChargeKind) -> Self {
        match kind {
            ChargeKind::Commission => Self::Commission,
            ChargeKind::Fee => Self::Fee,
            ChargeKind::Tax => Self::Tax,
        }
    }
}

impl From<charge::ChargeKind> for ChargeKind {
    fn from(kind: charge::ChargeKind) -> Self {
        match kind {
            charge::ChargeKind::Commission => Self::Commission,
            charge::ChargeKind::Fee => Self::Fee,
            charge::ChargeKind::Tax => Self::Tax,
        }
    }
}

/// How a charge rate is expressed.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rate_kind")]
pub enum RateKind {
    /// Percentage of the base amount.
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// Flat amount.
    #[sea_orm(string_value = "flat")]
    Flat,
}

/// Direction of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_direction")]
pub enum TransferDirection {
    /// Sent from an origin organisation.
    #[sea_orm(string_value = "outbound")]
    Outbound,
    /// Paid out by a destination organisation.
    #[sea_orm(string_value = "inbound")]
    Inbound,
}

impl From<TransferDirection> for lifecycle::Direction {
    fn from(direction: TransferDirection) -> Self {
        match direction {
            TransferDirection::Outbound => Self::Outbound,
            TransferDirection::Inbound => Self::Inbound,
        }
    }
}

/// Primary transfer status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_status")]
pub enum TransferStatus {
    /// Captured, not submitted.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Awaiting approval.
    #[sea_orm(string_value = "PENDING_APPROVAL")]
    PendingApproval,
    /// Ready for approval.
    #[sea_orm(string_value = "READY")]
    Ready,
    /// Approved.
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Settled.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Cancelled.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    /// Reversed.
    #[sea_orm(string_value = "REVERSED")]
    Reversed,
}

impl From<TransferStatus> for lifecycle::TransferStatus {
    fn from(status: TransferStatus) -> Self {
        match status {
            TransferStatus::Pending => Self::Pending,
            TransferStatus::PendingApproval => Self::PendingApproval,
            TransferStatus::Ready => Self::Ready,
            TransferStatus::Approved => Self::Approved,
            TransferStatus::Completed => Self::Completed,
            TransferStatus::Cancelled => Self::Cancelled,
            TransferStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<lifecycle::TransferStatus> for TransferStatus {
    fn from(status: lifecycle::TransferStatus) -> Self {
        match status {
            lifecycle::TransferStatus::Pending => Self::Pending,
            lifecycle::TransferStatus::PendingApproval => Self::PendingApproval,
            lifecycle::TransferStatus::Ready => Self::Ready,
            lifecycle::TransferStatus::Approved => Self::Approved,
            lifecycle::TransferStatus::Completed => Self::Completed,
            lifecycle::TransferStatus::Cancelled => Self::Cancelled,
            lifecycle::TransferStatus::Reversed => Self::Reversed,
        }
    }
}

/// Remittance track.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "remittance_status")]
pub enum RemittanceStatus {
    /// Nothing moved yet.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Available for pickup.
    #[sea_orm(string_value = "READY")]
    Ready,
    /// In transit.
    #[sea_orm(string_value = "TRANSIT")]
    Transit,
    /// Paid out.
    #[sea_orm(string_value = "PAID")]
    Paid,
}

impl From<RemittanceStatus> for lifecycle::RemittanceStatus {
    fn from(status: RemittanceStatus) -> Self {
        match status {
            RemittanceStatus::Pending => Self::Pending,
            RemittanceStatus::Ready => Self::Ready,
            RemittanceStatus::Transit => Self::Transit,
            RemittanceStatus::Paid => Self::Paid,
        }
    }
}

impl From<lifecycle::RemittanceStatus> for RemittanceStatus {
    fn from(status: lifecycle::RemittanceStatus) -> Self {
        match status {
            lifecycle::RemittanceStatus::Pending => Self::Pending,
            lifecycle::RemittanceStatus::Ready => Self::Ready,
            lifecycle::RemittanceStatus::Transit => Self::Transit,
            lifecycle::RemittanceStatus::Paid => Self::Paid,
        }
    }
}

/// Request track.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_status")]
pub enum RequestStatus {
    /// Submitted.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Ready.
    #[sea_orm(string_value = "READY")]
    Ready,
    /// Approved.
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Completed.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Cancelled.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    /// Reversed.
    #[sea_orm(string_value = "REVERSED")]
    Reversed,
}

impl From<lifecycle::RequestStatus> for RequestStatus {
    fn from(status: lifecycle::RequestStatus) -> Self {
        match status {
            lifecycle::RequestStatus::Pending => Self::Pending,
            lifecycle::RequestStatus::Ready => Self::Ready,
            lifecycle::RequestStatus::Approved => Self::Approved,
            lifecycle::RequestStatus::Completed => Self::Completed,
            lifecycle::RequestStatus::Cancelled => Self::Cancelled,
            lifecycle::RequestStatus::Reversed => Self::Reversed,
        }
    }
}

/// Status of a charge instantiated on a transfer.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_charge_status")]
pub enum TransferChargeStatus {
    /// In force.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Rejected on cancellation.
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    /// Undone on reversal.
    #[sea_orm(string_value = "REVERSED")]
    Reversed,
}

/// Party a commission split accrues to.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "split_role")]
pub enum SplitRole {
    /// The platform.
    #[sea_orm(string_value = "internal")]
    Internal,
    /// Origin organisation.
    #[sea_orm(string_value = "origin")]
    Origin,
    /// Destination organisation.
    #[sea_orm(string_value = "destination")]
    Destination,
}

/// Settlement status of a commission split.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "split_status")]
pub enum SplitStatus {
    /// Awaiting settlement.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Realised on settlement.
    #[sea_orm(string_value = "SETTLED")]
    Settled,
    /// Rejected on cancellation.
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    /// Undone on reversal.
    #[sea_orm(string_value = "REVERSED")]
    Reversed,
}

/// Actions recorded on the transfer audit trail.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_action")]
pub enum AuditAction {
    /// Transfer created.
    #[sea_orm(string_value = "CREATED")]
    Created,
    /// Transfer approved.
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Transfer reversed.
    #[sea_orm(string_value = "REVERSED")]
    Reversed,
    /// Transfer cancelled.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    /// Transfer marked ready.
    #[sea_orm(string_value = "MADE_READY")]
    MadeReady,
    /// Handling user reassigned.
    #[sea_orm(string_value = "REASSIGNED")]
    Reassigned,
    /// Fields updated and charges recomputed.
    #[sea_orm(string_value = "UPDATED")]
    Updated,
}
