//! Persistence ports consumed by the core services.
//!
//! The core never talks to a database directly. It depends on these async
//! traits; `reimburse-db` implements them over PostgreSQL and
//! [`memory::InMemoryStore`] implements them for tests and local runs.
//!
//! Two operations are conditional writes and carry the concurrency contract
//! of the workflow: [`ExpenseStore::transition`] and
//! [`ExpenseStore::bulk_approve_pending`] only touch rows that are still in
//! the expected status at write time, and report what they actually changed.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use reimburse_shared::AppError;
use reimburse_shared::types::{ExpenseId, SummaryId, UserId};

use crate::expense::types::{Expense, ExpenseStatus, StatusChange, User};
use crate::summary::types::Summary;

pub use memory::InMemoryStore;

/// Errors raised by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing database failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(msg) => Self::Database(msg),
            StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

/// User lookups.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by ID.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Finds every user whose ID is in `ids`. Missing IDs are skipped.
    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;
}

/// Expense queries and status writes.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Finds an expense by ID.
    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError>;

    /// Fetches every expense whose ID is in `ids` in one query.
    async fn find_expenses(&self, ids: &[ExpenseId]) -> Result<Vec<Expense>, StoreError>;

    /// Persists a new expense.
    async fn insert_expense(&self, expense: Expense) -> Result<Expense, StoreError>;

    /// Applies `change` only if the expense is still in `expected`.
    ///
    /// Returns the updated row, or `None` if no row matched (the expense
    /// vanished or another writer moved it first).
    async fn transition(
        &self,
        id: ExpenseId,
        expected: ExpenseStatus,
        change: &StatusChange,
    ) -> Result<Option<Expense>, StoreError>;

    /// Approves every listed expense that is still pending, in one write.
    ///
    /// Returns the number of rows actually updated.
    async fn bulk_approve_pending(
        &self,
        ids: &[ExpenseId],
        approver_id: UserId,
        approved_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Pending expenses of `user_id` created within `[start, end]`,
    /// ordered by expense date, newest first.
    async fn pending_for_user_between(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Expense>, StoreError>;

    /// Distinct owners of at least one pending expense.
    async fn users_with_pending(&self) -> Result<Vec<UserId>, StoreError>;
}

/// Summary persistence. Summaries are insert-only.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Persists a new summary.
    async fn insert_summary(&self, summary: Summary) -> Result<Summary, StoreError>;

    /// Finds a summary by ID.
    async fn find_summary(&self, id: SummaryId) -> Result<Option<Summary>, StoreError>;

    /// One page of summaries, newest first, plus the total matching count.
    async fn list_summaries(
        &self,
        user_id: Option<UserId>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Summary>, u64), StoreError>;
}
