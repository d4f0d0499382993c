//! Initial database migration.
//!
//! Creates the users, expenses and summaries tables with the constraints
//! that mirror the expense status invariants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(SUMMARIES_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

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

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    display_name VARCHAR(255) NOT NULL,
    avatar_url TEXT,
    role VARCHAR(16) NOT NULL DEFAULT 'EMPLOYEE'
        CHECK (role IN ('EMPLOYEE', 'MANAGER')),
    is_approved BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    description VARCHAR(255) NOT NULL,
    amount NUMERIC(12, 2) NOT NULL CHECK (amount > 0),
    date DATE NOT NULL,
    image_url TEXT,
    status VARCHAR(16) NOT NULL DEFAULT 'PENDING'
        CHECK (status IN ('PENDING', 'APPROVED', 'REJECTED', 'REIMBURSED')),
    approver_id UUID REFERENCES users(id),
    approval_date TIMESTAMPTZ,
    rejection_reason VARCHAR(500),
    paid_date TIMESTAMPTZ,
    paid_amount NUMERIC(12, 2) CHECK (paid_amount > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_rejection_reason CHECK ((status = 'REJECTED') = (rejection_reason IS NOT NULL)),
    CONSTRAINT chk_payment CHECK (
        (status = 'REIMBURSED') = (paid_amount IS NOT NULL AND paid_date IS NOT NULL)
    ),
    CONSTRAINT chk_approver CHECK ((status = 'PENDING') = (approver_id IS NULL))
);

-- Summary selection: one user's pending expenses by creation time
CREATE INDEX idx_expenses_user_status_created ON expenses(user_id, status, created_at);

-- Scheduler sweep: users with anything pending
CREATE INDEX idx_expenses_pending_user ON expenses(user_id) WHERE status = 'PENDING';
";

const SUMMARIES_SQL: &str = r"
CREATE TABLE summaries (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    start_date TIMESTAMPTZ NOT NULL,
    end_date TIMESTAMPTZ NOT NULL,
    total_amount NUMERIC(14, 2) NOT NULL,
    expense_count INTEGER NOT NULL CHECK (expense_count > 0),
    expenses JSONB NOT NULL,
    trigger_type VARCHAR(16) NOT NULL
        CHECK (trigger_type IN ('MANUAL', 'SUBMISSION', 'SCHEDULED')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_summary_window CHECK (start_date <= end_date)
);

CREATE INDEX idx_summaries_user_created ON summaries(user_id, created_at DESC);
CREATE INDEX idx_summaries_created ON summaries(created_at DESC);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_terminal_modification
-- Rejected and reimbursed expenses are final
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_terminal_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status IN ('REJECTED', 'REIMBURSED') THEN
        RAISE EXCEPTION 'Cannot modify expense % in terminal status %', OLD.id, OLD.status;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_terminal_mod
BEFORE UPDATE ON expenses
FOR EACH ROW
EXECUTE FUNCTION prevent_terminal_modification();

-- ============================================================
-- FUNCTION: prevent_summary_modification
-- Summaries are immutable snapshots
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_summary_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Summaries are immutable';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_summary_mod
BEFORE UPDATE ON summaries
FOR EACH ROW
EXECUTE FUNCTION prevent_summary_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS summaries CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS prevent_summary_modification();
DROP FUNCTION IF EXISTS prevent_terminal_modification();
";
