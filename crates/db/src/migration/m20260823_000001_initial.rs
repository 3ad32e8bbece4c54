//! Initial database migration.
//!
//! Creates the enums and tables for bookings, invoices, payments, bank
//! accounts, bank transactions, and expenses, with the integrity
//! constraints the repositories rely on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;
        db.execute_unprepared(BOOKINGS_SQL).await?;
        db.execute_unprepared(BOOKING_SERVICES_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_PAYMENTS_SQL).await?;
        db.execute_unprepared(BANK_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

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
CREATE TYPE booking_status AS ENUM (
    'upcoming',
    'completed',
    'cancelled'
);

-- Overdue is never stored; it is overlaid at read time.
CREATE TYPE invoice_status AS ENUM (
    'pending',
    'partial',
    'paid'
);

CREATE TYPE payment_method AS ENUM (
    'unpaid',
    'cash',
    'bank'
);

CREATE TYPE bank_transaction_kind AS ENUM (
    'deposit',
    'withdrawal',
    'transfer'
);
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY,
    bank_name VARCHAR(255) NOT NULL,
    account_name VARCHAR(255) NOT NULL,
    account_number VARCHAR(64) NOT NULL UNIQUE,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    undeposited NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_default BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_balance_non_negative CHECK (balance >= 0),
    CONSTRAINT chk_undeposited_non_negative CHECK (undeposited >= 0)
);

-- At most one default account.
CREATE UNIQUE INDEX uq_bank_accounts_default
    ON bank_accounts (is_default)
    WHERE is_default;
";

const BOOKINGS_SQL: &str = r"
CREATE TABLE bookings (
    id UUID PRIMARY KEY,
    client_name VARCHAR(255) NOT NULL,
    scheduled_at TIMESTAMP NOT NULL,
    location VARCHAR(255),
    amount NUMERIC(19, 4) NOT NULL,
    transportation_fee NUMERIC(19, 4) NOT NULL DEFAULT 0,
    early_morning_fee NUMERIC(19, 4) NOT NULL DEFAULT 0,
    reservation_fee NUMERIC(19, 4),
    status booking_status NOT NULL DEFAULT 'upcoming',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_booking_amount_non_negative CHECK (amount >= 0)
);

CREATE INDEX idx_bookings_scheduled_at ON bookings (scheduled_at);
CREATE INDEX idx_bookings_status ON bookings (status);
";

const BOOKING_SERVICES_SQL: &str = r"
CREATE TABLE booking_services (
    id UUID PRIMARY KEY,
    booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    service_name VARCHAR(255) NOT NULL,
    persons INTEGER NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,

    CONSTRAINT chk_persons_positive CHECK (persons > 0),
    CONSTRAINT chk_unit_price_non_negative CHECK (unit_price >= 0)
);

CREATE INDEX idx_booking_services_booking ON booking_services (booking_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number VARCHAR(32) NOT NULL UNIQUE,
    client_name VARCHAR(255) NOT NULL,
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    paid_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status invoice_status NOT NULL DEFAULT 'pending',
    payment_method payment_method NOT NULL DEFAULT 'unpaid',
    bank_account_id UUID REFERENCES bank_accounts(id) ON DELETE SET NULL,
    booking_id UUID REFERENCES bookings(id) ON DELETE SET NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_invoice_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_paid_within_amount CHECK (paid_amount >= 0 AND paid_amount <= amount)
);

CREATE INDEX idx_invoices_issue_date ON invoices (issue_date);
CREATE INDEX idx_invoices_status ON invoices (status);
CREATE INDEX idx_invoices_booking ON invoices (booking_id);
";

const INVOICE_PAYMENTS_SQL: &str = r"
CREATE TABLE invoice_payments (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    amount NUMERIC(19, 4) NOT NULL,
    method payment_method NOT NULL,
    bank_account_id UUID REFERENCES bank_accounts(id) ON DELETE SET NULL,
    paid_on DATE NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_payment_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_payment_method_real CHECK (method <> 'unpaid')
);

CREATE INDEX idx_invoice_payments_invoice ON invoice_payments (invoice_id);
";

const BANK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE bank_transactions (
    id UUID PRIMARY KEY,
    kind bank_transaction_kind NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description TEXT,
    source_account_id UUID REFERENCES bank_accounts(id) ON DELETE SET NULL,
    destination_account_id UUID REFERENCES bank_accounts(id) ON DELETE SET NULL,
    occurred_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_transaction_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transfer_distinct_accounts CHECK (
        kind <> 'transfer'
        OR source_account_id IS NULL
        OR destination_account_id IS NULL
        OR source_account_id <> destination_account_id
    )
);

CREATE INDEX idx_bank_transactions_occurred_on ON bank_transactions (occurred_on);
CREATE INDEX idx_bank_transactions_source ON bank_transactions (source_account_id);
CREATE INDEX idx_bank_transactions_destination ON bank_transactions (destination_account_id);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    incurred_on DATE NOT NULL,
    description TEXT NOT NULL,
    category VARCHAR(100) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    tax_deductible BOOLEAN NOT NULL DEFAULT FALSE,
    is_monthly BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_expense_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_expenses_incurred_on ON expenses (incurred_on);
CREATE INDEX idx_expenses_category ON expenses (category);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS bank_transactions CASCADE;
DROP TABLE IF EXISTS invoice_payments CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS booking_services CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;

DROP TYPE IF EXISTS bank_transaction_kind;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS booking_status;
";
