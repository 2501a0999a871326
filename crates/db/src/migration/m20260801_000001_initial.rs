//! Initial database migration.
//!
//! Creates all enums, tables, and indexes for the ledger and float-balance
//! engine, plus the seed currencies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE TABLES
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(CORRIDORS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(BENEFICIARIES_SQL).await?;
        db.execute_unprepared(PARAMETERS_SQL).await?;

        // ============================================================
        // PART 3: CUSTODY ACCOUNTS & HISTORY
        // ============================================================
        db.execute_unprepared(CUSTODY_SQL).await?;
        db.execute_unprepared(BALANCE_HISTORY_SQL).await?;

        // ============================================================
        // PART 4: ORGANISATION FLOAT LEDGER
        // ============================================================
        db.execute_unprepared(FLOAT_SQL).await?;

        // ============================================================
        // PART 5: GENERAL LEDGER
        // ============================================================
        db.execute_unprepared(GL_SQL).await?;

        // ============================================================
        // PART 6: CHARGES
        // ============================================================
        db.execute_unprepared(CHARGES_SQL).await?;

        // ============================================================
        // PART 7: TRANSFERS
        // ============================================================
        db.execute_unprepared(TRANSFERS_SQL).await?;

        // ============================================================
        // PART 8: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_CURRENCIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Organisation status
CREATE TYPE org_status AS ENUM ('ACTIVE', 'INACTIVE');

-- Destination integration
CREATE TYPE integration_kind AS ENUM ('internal', 'external');

-- Corridor status
CREATE TYPE corridor_status AS ENUM ('ACTIVE', 'INACTIVE');

-- Custody account kinds
CREATE TYPE custody_kind AS ENUM ('bank_account', 'vault', 'till');

-- Balance history targets
CREATE TYPE balance_entity_kind AS ENUM (
    'bank_account',
    'vault',
    'till',
    'org_balance'
);

-- GL account types
CREATE TYPE gl_account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- GL account entity bindings
CREATE TYPE gl_entity_kind AS ENUM ('custody_account', 'org_balance', 'charge');

-- GL entry side
CREATE TYPE entry_side AS ENUM ('debit', 'credit');

-- GL transaction status
CREATE TYPE gl_transaction_status AS ENUM ('DRAFT', 'POSTED');

-- Charge kinds
CREATE TYPE charge_kind AS ENUM ('commission', 'fee', 'tax');

-- Charge rate kinds
CREATE TYPE rate_kind AS ENUM ('percentage', 'flat');

-- Transfer direction
CREATE TYPE transfer_direction AS ENUM ('outbound', 'inbound');

-- Transfer primary status
CREATE TYPE transfer_status AS ENUM (
    'PENDING',
    'PENDING_APPROVAL',
    'READY',
    'APPROVED',
    'COMPLETED',
    'CANCELLED',
    'REVERSED'
);

-- Remittance track
CREATE TYPE remittance_status AS ENUM ('PENDING', 'READY', 'TRANSIT', 'PAID');

-- Request track
CREATE TYPE request_status AS ENUM (
    'PENDING',
    'READY',
    'APPROVED',
    'COMPLETED',
    'CANCELLED',
    'REVERSED'
);

-- Transfer charge status
CREATE TYPE transfer_charge_status AS ENUM ('ACTIVE', 'REJECTED', 'REVERSED');

-- Commission split role
CREATE TYPE split_role AS ENUM ('internal', 'origin', 'destination');

-- Commission split status
CREATE TYPE split_status AS ENUM ('PENDING', 'SETTLED', 'REJECTED', 'REVERSED');

-- Transfer audit actions
CREATE TYPE audit_action AS ENUM (
    'CREATED',
    'APPROVED',
    'REVERSED',
    'CANCELLED',
    'MADE_READY',
    'REASSIGNED',
    'UPDATED'
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY,
    code VARCHAR(32) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    status org_status NOT NULL DEFAULT 'ACTIVE',
    integration integration_kind NOT NULL DEFAULT 'internal',
    is_platform BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_organization ON users(organization_id);
";

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    id UUID PRIMARY KEY,
    code VARCHAR(3) NOT NULL UNIQUE,
    name VARCHAR(64) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CORRIDORS_SQL: &str = r"
CREATE TABLE corridors (
    id UUID PRIMARY KEY,
    origin_org_id UUID NOT NULL REFERENCES organizations(id),
    dest_org_id UUID NOT NULL REFERENCES organizations(id),
    currency_id UUID NOT NULL REFERENCES currencies(id),
    status corridor_status NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (origin_org_id, dest_org_id, currency_id)
);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(32),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_organization ON customers(organization_id);
";

const BENEFICIARIES_SQL: &str = r"
CREATE TABLE beneficiaries (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id),
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(32),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_beneficiaries_customer ON beneficiaries(customer_id);
";

const PARAMETERS_SQL: &str = r"
CREATE TABLE parameters (
    key VARCHAR(128) PRIMARY KEY,
    value TEXT NOT NULL,
    description TEXT,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CUSTODY_SQL: &str = r"
CREATE TABLE custody_accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    currency_id UUID NOT NULL REFERENCES currencies(id),
    kind custody_kind NOT NULL,
    name VARCHAR(255) NOT NULL,
    balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    locked_balance NUMERIC(20, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_custody_org_kind ON custody_accounts(organization_id, kind);

CREATE TABLE till_sessions (
    id UUID PRIMARY KEY,
    till_account_id UUID NOT NULL REFERENCES custody_accounts(id),
    user_id UUID NOT NULL REFERENCES users(id),
    opened_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    closed_at TIMESTAMPTZ
);

-- At most one open session per user.
CREATE UNIQUE INDEX idx_till_sessions_open_user
    ON till_sessions(user_id) WHERE closed_at IS NULL;
";

const BALANCE_HISTORY_SQL: &str = r"
CREATE TABLE balance_history (
    id UUID PRIMARY KEY,
    entity_kind balance_entity_kind NOT NULL,
    entity_id UUID NOT NULL,
    currency_id UUID NOT NULL REFERENCES currencies(id),
    old_balance NUMERIC(20, 4) NOT NULL,
    new_balance NUMERIC(20, 4) NOT NULL,
    change_amount NUMERIC(20, 4) NOT NULL,
    action VARCHAR(32) NOT NULL,
    description TEXT NOT NULL,
    actor_id UUID,
    actor_ip VARCHAR(45),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (new_balance - old_balance = change_amount)
);

CREATE INDEX idx_balance_history_entity ON balance_history(entity_kind, entity_id);
";

const FLOAT_SQL: &str = r"
CREATE TABLE org_balances (
    id UUID PRIMARY KEY,
    base_org_id UUID NOT NULL REFERENCES organizations(id),
    dest_org_id UUID NOT NULL REFERENCES organizations(id),
    currency_id UUID NOT NULL REFERENCES currencies(id),
    balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    locked_balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    balance_limit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (base_org_id, dest_org_id, currency_id),
    CHECK (balance - locked_balance >= 0)
);

CREATE TABLE periodic_org_balances (
    id UUID PRIMARY KEY,
    org_balance_id UUID NOT NULL REFERENCES org_balances(id),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    opening_balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    closing_balance NUMERIC(20, 4),
    transactions_in NUMERIC(20, 4) NOT NULL DEFAULT 0,
    transactions_out NUMERIC(20, 4) NOT NULL DEFAULT 0,
    commissions NUMERIC(20, 4) NOT NULL DEFAULT 0,
    deposits NUMERIC(20, 4) NOT NULL DEFAULT 0,
    withdrawals NUMERIC(20, 4) NOT NULL DEFAULT 0,
    balance_limit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    is_current BOOLEAN NOT NULL DEFAULT TRUE,
    closed_by UUID,
    closed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (org_balance_id, year, month)
);

-- At most one current period per org balance.
CREATE UNIQUE INDEX idx_periodic_current
    ON periodic_org_balances(org_balance_id) WHERE is_current;
";

const GL_SQL: &str = r"
CREATE TABLE gl_accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type gl_account_type NOT NULL,
    currency_id UUID NOT NULL REFERENCES currencies(id),
    entity_kind gl_entity_kind,
    entity_id UUID,
    balance NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, code)
);

CREATE INDEX idx_gl_accounts_entity
    ON gl_accounts(entity_kind, entity_id, organization_id);

CREATE TABLE gl_transactions (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    transfer_id UUID,
    reversal_of_id UUID REFERENCES gl_transactions(id),
    status gl_transaction_status NOT NULL DEFAULT 'POSTED',
    description TEXT NOT NULL,
    posted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_gl_transactions_transfer ON gl_transactions(transfer_id);

CREATE TABLE gl_entries (
    id UUID PRIMARY KEY,
    gl_transaction_id UUID NOT NULL REFERENCES gl_transactions(id),
    gl_account_id UUID NOT NULL REFERENCES gl_accounts(id),
    side entry_side NOT NULL,
    amount NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    memo TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_gl_entries_transaction ON gl_entries(gl_transaction_id);
CREATE INDEX idx_gl_entries_account ON gl_entries(gl_account_id);
";

const CHARGES_SQL: &str = r"
CREATE TABLE charges (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    kind charge_kind NOT NULL,
    rate_kind rate_kind NOT NULL,
    rate_value NUMERIC(10, 4) NOT NULL,
    min_amount NUMERIC(20, 4),
    max_amount NUMERIC(20, 4),
    currency_id UUID REFERENCES currencies(id),
    origin_org_id UUID REFERENCES organizations(id),
    dest_org_id UUID REFERENCES organizations(id),
    internal_share NUMERIC(5, 2) NOT NULL DEFAULT 100,
    origin_share NUMERIC(5, 2) NOT NULL DEFAULT 0,
    destination_share NUMERIC(5, 2) NOT NULL DEFAULT 0,
    reversible BOOLEAN NOT NULL DEFAULT TRUE,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSFERS_SQL: &str = r"
CREATE TABLE transfers (
    id UUID PRIMARY KEY,
    number VARCHAR(64) NOT NULL,
    direction transfer_direction NOT NULL,
    origin_org_id UUID NOT NULL REFERENCES organizations(id),
    dest_org_id UUID NOT NULL REFERENCES organizations(id),
    corridor_id UUID NOT NULL REFERENCES corridors(id),
    customer_id UUID NOT NULL REFERENCES customers(id),
    beneficiary_id UUID NOT NULL REFERENCES beneficiaries(id),
    currency_id UUID NOT NULL REFERENCES currencies(id),
    amount NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    total_commissions NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_taxes NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_all_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    amount_payable NUMERIC(20, 4) NOT NULL,
    status transfer_status NOT NULL DEFAULT 'PENDING_APPROVAL',
    remittance_status remittance_status NOT NULL DEFAULT 'PENDING',
    request_status request_status NOT NULL DEFAULT 'PENDING',
    till_session_id UUID REFERENCES till_sessions(id),
    assigned_user_id UUID REFERENCES users(id),
    linked_transfer_id UUID REFERENCES transfers(id),
    notes TEXT,
    created_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (number, direction)
);

CREATE INDEX idx_transfers_status ON transfers(status);
CREATE INDEX idx_transfers_origin ON transfers(origin_org_id);

-- Idempotency guard: one inbound mirror per outbound transfer.
CREATE UNIQUE INDEX idx_transfers_inbound_link
    ON transfers(linked_transfer_id)
    WHERE direction = 'inbound' AND linked_transfer_id IS NOT NULL;

CREATE TABLE transfer_charges (
    id UUID PRIMARY KEY,
    transfer_id UUID NOT NULL REFERENCES transfers(id),
    charge_id UUID NOT NULL REFERENCES charges(id),
    kind charge_kind NOT NULL,
    name VARCHAR(255) NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    negotiated_rate NUMERIC(10, 4),
    internal_share NUMERIC(20, 4) NOT NULL DEFAULT 0,
    origin_share NUMERIC(20, 4) NOT NULL DEFAULT 0,
    destination_share NUMERIC(20, 4) NOT NULL DEFAULT 0,
    reversible BOOLEAN NOT NULL DEFAULT TRUE,
    status transfer_charge_status NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transfer_charges_transfer ON transfer_charges(transfer_id);

CREATE TABLE commission_splits (
    id UUID PRIMARY KEY,
    transfer_charge_id UUID NOT NULL REFERENCES transfer_charges(id) ON DELETE CASCADE,
    transfer_id UUID NOT NULL REFERENCES transfers(id),
    role split_role NOT NULL,
    organization_id UUID REFERENCES organizations(id),
    amount NUMERIC(20, 4) NOT NULL,
    status split_status NOT NULL DEFAULT 'PENDING',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_commission_splits_transfer ON commission_splits(transfer_id);

CREATE TABLE transfer_audits (
    id UUID PRIMARY KEY,
    transfer_id UUID NOT NULL REFERENCES transfers(id),
    action audit_action NOT NULL,
    status_before transfer_status,
    status_after transfer_status NOT NULL,
    notes TEXT,
    actor_id UUID,
    actor_ip VARCHAR(45),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transfer_audits_transfer ON transfer_audits(transfer_id);
";

const SEED_CURRENCIES_SQL: &str = r"
INSERT INTO currencies (id, code, name) VALUES
    ('c0000000-0000-0000-0000-000000000001', 'USD', 'US Dollar'),
    ('c0000000-0000-0000-0000-000000000002', 'EUR', 'Euro'),
    ('c0000000-0000-0000-0000-000000000003', 'GBP', 'Pound Sterling'),
    ('c0000000-0000-0000-0000-000000000004', 'KES', 'Kenyan Shilling'),
    ('c0000000-0000-0000-0000-000000000005', 'SOS', 'Somali Shilling')
ON CONFLICT (code) DO NOTHING;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS transfer_audits CASCADE;
DROP TABLE IF EXISTS commission_splits CASCADE;
DROP TABLE IF EXISTS transfer_charges CASCADE;
DROP TABLE IF EXISTS transfers CASCADE;
DROP TABLE IF EXISTS charges CASCADE;
DROP TABLE IF EXISTS gl_entries CASCADE;
DROP TABLE IF EXISTS gl_transactions CASCADE;
DROP TABLE IF EXISTS gl_accounts CASCADE;
DROP TABLE IF EXISTS periodic_org_balances CASCADE;
DROP TABLE IF EXISTS org_balances CASCADE;
DROP TABLE IF EXISTS balance_history CASCADE;
DROP TABLE IF EXISTS till_sessions CASCADE;
DROP TABLE IF EXISTS custody_accounts CASCADE;
DROP TABLE IF EXISTS parameters CASCADE;
DROP TABLE IF EXISTS beneficiaries CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS corridors CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;

DROP TYPE IF EXISTS audit_action;
DROP TYPE IF EXISTS split_status;
DROP TYPE IF EXISTS split_role;
DROP TYPE IF EXISTS transfer_charge_status;
DROP TYPE IF EXISTS request_status;
DROP TYPE IF EXISTS remittance_status;
DROP TYPE IF EXISTS transfer_status;
DROP TYPE IF EXISTS transfer_direction;
DROP TYPE IF EXISTS rate_kind;
DROP TYPE IF EXISTS charge_kind;
DROP TYPE IF EXISTS gl_transaction_status;
DROP TYPE IF EXISTS entry_side;
DROP TYPE IF EXISTS gl_entity_kind;
DROP TYPE IF EXISTS gl_account_type;
DROP TYPE IF EXISTS balance_entity_kind;
DROP TYPE IF EXISTS custody_kind;
DROP TYPE IF EXISTS corridor_status;
DROP TYPE IF EXISTS integration_kind;
DROP TYPE IF EXISTS org_status;
";
