//! `SeaORM` entity definitions.

pub mod sea_orm_active_enums;

pub mod balance_history;
pub mod beneficiaries;
pub mod charges;
pub mod commission_splits;
pub mod corridors;
pub mod currencies;
pub mod custody_accounts;
pub mod customers;
pub mod gl_accounts;
pub mod gl_entries;
pub mod gl_transactions;
pub mod org_balances;
pub mod organizations;
pub mod parameters;
pub mod periodic_org_balances;
pub mod till_sessions;
pub mod transfer_audits;
pub mod transfer_charges;
pub mod transfers;
pub mod users;
