//! In-memory store.
//!
//! Every operation holds one mutex for its whole read-check-write, which
//! gives the same atomicity the SQL conditional writes provide.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use reimburse_shared::types::{ExpenseId, SummaryId, UserId};

use crate::expense::types::{Expense, ExpenseStatus, StatusChange, User};
use crate::store::{ExpenseStore, StoreError, SummaryStore, UserStore};
use crate::summary::types::{DateRange, Summary};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    expenses: HashMap<ExpenseId, Expense>,
    summaries: Vec<Summary>,
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a user.
    pub async fn put_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Stores an expense as-is, bypassing the workflow.
    pub async fn put_expense(&self, expense: Expense) {
        self.state.lock().await.expenses.insert(expense.id, expense);
    }

    /// Number of persisted summaries.
    pub async fn summary_count(&self) -> usize {
        self.state.lock().await.summaries.len()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        Ok(self.state.lock().await.expenses.get(&id).cloned())
    }

    async fn find_expenses(&self, ids: &[ExpenseId]) -> Result<Vec<Expense>, StoreError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.expenses.get(id).cloned())
            .collect())
    }

    async fn insert_expense(&self, expense: Expense) -> Result<Expense, StoreError> {
        let mut state = self.state.lock().await;
        if state.expenses.contains_key(&expense.id) {
            return Err(StoreError::Database(format!(
                "duplicate expense id {}",
                expense.id
            )));
        }
        state.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn transition(
        &self,
        id: ExpenseId,
        expected: ExpenseStatus,
        change: &StatusChange,
    ) -> Result<Option<Expense>, StoreError> {
        let mut state = self.state.lock().await;
        match state.expenses.get_mut(&id) {
            Some(expense) if expense.status == expected => {
                expense.apply(change, Utc::now());
                Ok(Some(expense.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn bulk_approve_pending(
        &self,
        ids: &[ExpenseId],
        approver_id: UserId,
        approved_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let change = StatusChange::Approve {
            approver_id,
            approved_at,
        };
        let unique: BTreeSet<ExpenseId> = ids.iter().copied().collect();

        let mut updated = 0;
        for id in unique {
            if let Some(expense) = state.expenses.get_mut(&id)
                && expense.status == ExpenseStatus::Pending
            {
                expense.apply(&change, approved_at);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn pending_for_user_between(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Expense>, StoreError> {
        let window = DateRange { start, end };
        let state = self.state.lock().await;
        let mut selected: Vec<Expense> = state
            .expenses
            .values()
            .filter(|e| {
                e.user_id == user_id
                    && e.status == ExpenseStatus::Pending
                    && window.contains(e.created_at)
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(selected)
    }

    async fn users_with_pending(&self) -> Result<Vec<UserId>, StoreError> {
        let state = self.state.lock().await;
        let owners: BTreeSet<UserId> = state
            .expenses
            .values()
            .filter(|e| e.status == ExpenseStatus::Pending)
            .map(|e| e.user_id)
            .collect();
        Ok(owners.into_iter().collect())
    }
}

#[async_trait]
impl SummaryStore for InMemoryStore {
    async fn insert_summary(&self, summary: Summary) -> Result<Summary, StoreError> {
        self.state.lock().await.summaries.push(summary.clone());
        Ok(summary)
    }

    async fn find_summary(&self, id: SummaryId) -> Result<Option<Summary>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .summaries
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn list_summaries(
        &self,
        user_id: Option<UserId>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Summary>, u64), StoreError> {
        let state = self.state.lock().await;
        let mut matching: Vec<&Summary> = state
            .summaries
            .iter()
            .filter(|s| user_id.is_none_or(|u| s.user_id == u))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let page = matching.into_iter().skip(skip).take(take).cloned().collect();
        Ok((page, total))
    }
}
