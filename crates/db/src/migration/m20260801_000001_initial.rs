//! Initial database migration.
//!
//! Creates the enums, reference data, account, ledger, and loan tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;

        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(GL_ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(MEMBER_ACCOUNTS_SQL).await?;

        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        db.execute_unprepared(LOAN_PRODUCTS_SQL).await?;
        db.execute_unprepared(LOAN_APPLICATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
-- Ledger leg side
CREATE TYPE entry_type AS ENUM ('debit', 'credit');

-- Approval status of a reference group
CREATE TYPE entry_status AS ENUM (
    'pending',
    'approved',
    'returned',
    'rejected'
);

-- Loan application lifecycle
CREATE TYPE loan_status AS ENUM (
    'pending_appraisal',
    'sanctioned',
    'approved',
    'rejected',
    'disbursed'
);
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    member_number VARCHAR(50) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_members_number ON members(member_number) WHERE is_active = true;
";

const GL_ACCOUNTS_SQL: &str = r"
CREATE TABLE gl_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    available_balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    balance_floor NUMERIC(19, 2) NOT NULL DEFAULT 0,
    allow_overdraft BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNT_TYPES_SQL: &str = r"
CREATE TABLE account_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const MEMBER_ACCOUNTS_SQL: &str = r"
CREATE TABLE member_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    member_id UUID NOT NULL REFERENCES members(id),
    account_type_id UUID NOT NULL REFERENCES account_types(id),
    account_number VARCHAR(50) NOT NULL UNIQUE,
    available_balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    balance_floor NUMERIC(19, 2) NOT NULL DEFAULT 0,
    allow_overdraft BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_member_accounts_member ON member_accounts(member_id);
CREATE INDEX idx_member_accounts_type ON member_accounts(account_type_id);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    reference_number VARCHAR(100) NOT NULL,
    gl_account_id UUID REFERENCES gl_accounts(id),
    member_account_id UUID REFERENCES member_accounts(id),
    entry_type entry_type NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    status entry_status NOT NULL DEFAULT 'pending',
    verifier_remarks TEXT,
    verified_by UUID,
    verified_at TIMESTAMPTZ,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_ledger_entries_amount_positive CHECK (amount > 0),
    -- exactly one account side per leg
    CONSTRAINT chk_ledger_entries_one_account CHECK (
        (gl_account_id IS NULL) <> (member_account_id IS NULL)
    )
);

CREATE INDEX idx_ledger_entries_reference ON ledger_entries(reference_number);
CREATE INDEX idx_ledger_entries_gl_account ON ledger_entries(gl_account_id)
    WHERE gl_account_id IS NOT NULL;
CREATE INDEX idx_ledger_entries_member_account ON ledger_entries(member_account_id)
    WHERE member_account_id IS NOT NULL;
CREATE INDEX idx_ledger_entries_status ON ledger_entries(status);
";

const LOAN_PRODUCTS_SQL: &str = r"
CREATE TABLE loan_products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    funding_gl_account_id UUID NOT NULL REFERENCES gl_accounts(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const LOAN_APPLICATIONS_SQL: &str = r"
CREATE TABLE loan_applications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_number VARCHAR(50) NOT NULL UNIQUE,
    member_id UUID NOT NULL REFERENCES members(id),
    product_id UUID NOT NULL REFERENCES loan_products(id),
    loan_amount NUMERIC(19, 2) NOT NULL,
    status loan_status NOT NULL DEFAULT 'pending_appraisal',
    disbursed_account_id UUID REFERENCES member_accounts(id),
    disbursement_reference VARCHAR(100),
    disbursed_by UUID,
    disbursed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_loan_applications_amount_positive CHECK (loan_amount > 0)
);

CREATE INDEX idx_loan_applications_member ON loan_applications(member_id);
CREATE INDEX idx_loan_applications_status ON loan_applications(status);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS loan_applications;
DROP TABLE IF EXISTS loan_products;
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS member_accounts;
DROP TABLE IF EXISTS account_types;
DROP TABLE IF EXISTS gl_accounts;
DROP TABLE IF EXISTS members;
DROP TYPE IF EXISTS loan_status;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS entry_type;
";
