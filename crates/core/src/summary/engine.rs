//! Summary aggregation engine.
//!
//! Snapshots a user's pending expenses over a reporting window and persists
//! the result. Nothing is written when the selection is empty.
//!
//! Repeated runs over the same window create overlapping summaries. The
//! caller decides how often to run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use reimburse_shared::types::{Amount, SummaryId, UserId};

use crate::store::{ExpenseStore, SummaryStore, UserStore};
use crate::summary::error::SummaryError;
use crate::summary::period::resolve_window;
use crate::summary::types::{ExpenseSnapshot, Summary, SummaryView, TriggerType};

/// Generates and persists expense summaries.
#[derive(Clone)]
pub struct SummaryEngine {
    users: Arc<dyn UserStore>,
    expenses: Arc<dyn ExpenseStore>,
    summaries: Arc<dyn SummaryStore>,
    timezone: Tz,
}

impl SummaryEngine {
    /// Creates a new engine; `timezone` drives the weekday cutoff.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        expenses: Arc<dyn ExpenseStore>,
        summaries: Arc<dyn SummaryStore>,
        timezone: Tz,
    ) -> Self {
        Self {
            users,
            expenses,
            summaries,
            timezone,
        }
    }

    /// Generates a summary for one user over the given or default window.
    ///
    /// Returns `Ok(None)` when the user does not exist or has no pending
    /// expenses created within the window.
    ///
    /// # Errors
    /// * `InvalidRange` if `start` is after `end`
    /// * `Store` on persistence failure
    pub async fn generate_for_user(
        &self,
        user_id: UserId,
        trigger: TriggerType,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Option<SummaryView>, SummaryError> {
        self.generate_for_user_at(Utc::now(), user_id, trigger, start, end)
            .await
    }

    /// [`Self::generate_for_user`] with an explicit clock.
    pub async fn generate_for_user_at(
        &self,
        now: DateTime<Utc>,
        user_id: UserId,
        trigger: TriggerType,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Option<SummaryView>, SummaryError> {
        let window = resolve_window(now, self.timezone, start, end)?;

        let Some(user) = self.users.find_user(user_id).await? else {
            return Ok(None);
        };

        let mut selected = self
            .expenses
            .pending_for_user_between(user_id, window.start, window.end)
            .await?;
        if selected.is_empty() {
            return Ok(None);
        }
        selected.sort_by(|a, b| b.date.cmp(&a.date));

        let total_amount: Amount = selected.iter().map(|e| e.amount).sum();
        let expenses: Vec<ExpenseSnapshot> = selected.iter().map(ExpenseSnapshot::from).collect();

        let summary = Summary {
            id: SummaryId::new(),
            user_id,
            start_date: window.start,
            end_date: window.end,
            total_amount,
            expense_count: u32::try_from(expenses.len()).unwrap_or(u32::MAX),
            expenses,
            trigger_type: trigger,
            created_at: now,
        };
        let saved = self.summaries.insert_summary(summary).await?;

        Ok(Some(SummaryView::new(saved, Some(&user))))
    }

    /// Generates default-window summaries for every user with a pending
    /// expense, one after another.
    ///
    /// # Errors
    /// Stops at the first store failure.
    pub async fn generate_all_pending(
        &self,
        trigger: TriggerType,
    ) -> Result<Vec<SummaryView>, SummaryError> {
        self.generate_all_pending_at(Utc::now(), trigger).await
    }

    /// [`Self::generate_all_pending`] with an explicit clock.
    pub async fn generate_all_pending_at(
        &self,
        now: DateTime<Utc>,
        trigger: TriggerType,
    ) -> Result<Vec<SummaryView>, SummaryError> {
        let owners = self.expenses.users_with_pending().await?;

        let mut generated = Vec::new();
        for user_id in owners {
            if let Some(view) = self
                .generate_for_user_at(now, user_id, trigger, None, None)
                .await?
            {
                generated.push(view);
            }
        }
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, NaiveDate, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::expense::types::{Expense, ExpenseStatus, NewExpense, StatusChange, User};
    use crate::permission::Role;
    use crate::store::InMemoryStore;

    // Wednesday; the default window opens Tuesday 2026-10-20 00:00 UTC.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 21, 12, 0, 0).unwrap()
    }

    fn engine(store: &Arc<InMemoryStore>) -> SummaryEngine {
        SummaryEngine::new(store.clone(), store.clone(), store.clone(), Tz::UTC)
    }

    async fn user(store: &InMemoryStore, name: &str) -> UserId {
        let id = UserId::new();
        store
            .put_user(User {
                id,
                display_name: name.to_string(),
                avatar_url: Some(format!("avatars/{name}.png")),
                role: Role::Employee,
                is_approved: true,
            })
            .await;
        id
    }

    async fn expense(
        store: &InMemoryStore,
        owner: UserId,
        amount: Decimal,
        day: u32,
        created_at: DateTime<Utc>,
    ) -> Expense {
        let expense = Expense::pending(
            owner,
            NewExpense {
                description: format!("Expense on day {day}"),
                amount: Amount::new(amount),
                date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
                image_url: None,
            },
            created_at,
        );
        store.put_expense(expense.clone()).await;
        expense
    }

    #[tokio::test]
    async fn test_total_is_exact_decimal_sum() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;
        let created = now() - Duration::hours(2);
        expense(&store, owner, dec!(100.50), 19, created).await;
        expense(&store, owner, dec!(200.25), 20, created).await;

        let view = engine(&store)
            .generate_for_user_at(now(), owner, TriggerType::Manual, None, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(view.summary.total_amount.to_string(), "300.75");
        assert_eq!(view.summary.expense_count, 2);
        assert_eq!(view.summary.trigger_type, TriggerType::Manual);
        assert_eq!(view.user_name.as_deref(), Some("dana"));
        assert_eq!(view.user_avatar.as_deref(), Some("avatars/dana.png"));
        assert_eq!(store.summary_count().await, 1);
    }

    #[tokio::test]
    async fn test_snapshots_ordered_by_date_descending() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;
        let created = now() - Duration::hours(1);
        expense(&store, owner, dec!(1), 3, created).await;
        expense(&store, owner, dec!(2), 17, created).await;
        expense(&store, owner, dec!(3), 9, created).await;

        let view = engine(&store)
            .generate_for_user_at(now(), owner, TriggerType::Manual, None, None)
            .await
            .unwrap()
            .unwrap();

        let days: Vec<u32> = view.summary.expenses.iter().map(|s| s.date.day()).collect();
        assert_eq!(days, vec![17, 9, 3]);
        assert!(
            view.summary
                .expenses
                .iter()
                .all(|s| s.status == ExpenseStatus::Pending)
        );
    }

    #[tokio::test]
    async fn test_no_pending_expenses_creates_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;

        let result = engine(&store)
            .generate_for_user_at(now(), owner, TriggerType::Manual, None, None)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.summary_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let result = engine(&store)
            .generate_for_user_at(now(), UserId::new(), TriggerType::Manual, None, None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_only_pending_within_window_selected() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;
        let inside = now() - Duration::hours(3);
        let before_window = Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 59).unwrap();

        let kept = expense(&store, owner, dec!(10), 20, inside).await;
        expense(&store, owner, dec!(20), 19, before_window).await;
        let mut approved = expense(&store, owner, dec!(40), 20, inside).await;
        approved.apply(
            &StatusChange::Approve {
                approver_id: UserId::new(),
                approved_at: inside,
            },
            inside,
        );
        store.put_expense(approved).await;

        let view = engine(&store)
            .generate_for_user_at(now(), owner, TriggerType::Scheduled, None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.summary.expense_count, 1);
        assert_eq!(view.summary.expenses[0].id, kept.id);
        assert_eq!(
            view.summary.start_date,
            Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(view.summary.end_date, now());
    }

    #[tokio::test]
    async fn test_explicit_window_overrides_default() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;
        let old = Utc.with_ymd_and_hms(2026, 9, 10, 8, 0, 0).unwrap();
        expense(&store, owner, dec!(70), 9, old).await;

        let start = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 9, 30, 0, 0, 0).unwrap();
        let view = engine(&store)
            .generate_for_user_at(now(), owner, TriggerType::Manual, Some(start), Some(end))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.summary.total_amount, Amount::new(dec!(70)));
        assert_eq!(view.summary.start_date, start);
    }

    #[tokio::test]
    async fn test_inverted_window_fails_before_any_write() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;
        let start = Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();

        let err = engine(&store)
            .generate_for_user_at(now(), owner, TriggerType::Manual, Some(start), Some(end))
            .await
            .unwrap_err();
        assert_eq!(err, SummaryError::InvalidRange { start, end });
        assert_eq!(store.summary_count().await, 0);
    }

    #[tokio::test]
    async fn test_snapshot_is_immutable_after_later_transitions() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;
        let created = now() - Duration::hours(1);
        let mut item = expense(&store, owner, dec!(55), 20, created).await;

        let view = engine(&store)
            .generate_for_user_at(now(), owner, TriggerType::Manual, None, None)
            .await
            .unwrap()
            .unwrap();

        item.apply(
            &StatusChange::Approve {
                approver_id: UserId::new(),
                approved_at: now(),
            },
            now(),
        );
        store.put_expense(item).await;

        let stored = store.find_summary(view.summary.id).await.unwrap().unwrap();
        assert_eq!(stored.expenses[0].status, ExpenseStatus::Pending);
    }

    #[tokio::test]
    async fn test_generate_all_pending_skips_users_without_window_items() {
        let store = Arc::new(InMemoryStore::new());
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let carol = user(&store, "carol").await;
        let recent = now() - Duration::hours(1);
        let stale = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();

        expense(&store, alice, dec!(12.30), 20, recent).await;
        expense(&store, bob, dec!(9.99), 20, recent).await;
        expense(&store, bob, dec!(0.01), 21, recent).await;
        // Pending but created before the window.
        expense(&store, carol, dec!(5), 1, stale).await;

        let mut views = engine(&store)
            .generate_all_pending_at(now(), TriggerType::Scheduled)
            .await
            .unwrap();
        views.sort_by(|a, b| a.user_name.cmp(&b.user_name));

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].summary.user_id, alice);
        assert_eq!(views[1].summary.user_id, bob);
        assert_eq!(views[1].summary.total_amount, Amount::new(dec!(10.00)));
        assert!(
            views
                .iter()
                .all(|v| v.summary.trigger_type == TriggerType::Scheduled)
        );
        assert_eq!(store.summary_count().await, 2);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_not_deduplicated() {
        let store = Arc::new(InMemoryStore::new());
        let owner = user(&store, "dana").await;
        expense(&store, owner, dec!(8), 20, now() - Duration::hours(1)).await;

        let engine = engine(&store);
        engine
            .generate_all_pending_at(now(), TriggerType::Scheduled)
            .await
            .unwrap();
        engine
            .generate_all_pending_at(now(), TriggerType::Scheduled)
            .await
            .unwrap();
        assert_eq!(store.summary_count().await, 2);
    }
}
