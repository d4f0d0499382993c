//! Expense lifecycle service.
//!
//! Single-item status mutation: load, check against the permission policy,
//! then write conditionally on the status that was checked. A concurrent
//! writer that got there first makes the conditional write match nothing,
//! and the caller sees `IllegalTransition` against the fresh status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use reimburse_shared::types::{ExpenseId, UserId};

use crate::expense::error::ExpenseError;
use crate::expense::types::{Expense, ExpenseStatus, ExpenseView, NewExpense, StatusChange, UserProfile};
use crate::expense::validation;
use crate::permission::{Actor, PermissionPolicy};
use crate::store::{ExpenseStore, UserStore};

/// Applies workflow transitions to single expenses.
#[derive(Clone)]
pub struct ExpenseLifecycleService {
    pub(crate) users: Arc<dyn UserStore>,
    pub(crate) expenses: Arc<dyn ExpenseStore>,
    timezone: Tz,
}

impl ExpenseLifecycleService {
    /// Creates a new lifecycle service judging dates in UTC.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, expenses: Arc<dyn ExpenseStore>) -> Self {
        Self {
            users,
            expenses,
            timezone: Tz::UTC,
        }
    }

    /// Judges "today" for submitted expense dates in `timezone`.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Submits a new pending expense owned by the actor.
    ///
    /// # Errors
    /// * `Validation` if the description, amount or date is malformed
    pub async fn submit(&self, actor: Actor, input: NewExpense) -> Result<ExpenseView, ExpenseError> {
        self.submit_at(Utc::now(), actor, input).await
    }

    /// [`Self::submit`] with an explicit clock.
    ///
    /// The expense date may not be later than the local date of `now`.
    pub async fn submit_at(
        &self,
        now: DateTime<Utc>,
        actor: Actor,
        input: NewExpense,
    ) -> Result<ExpenseView, ExpenseError> {
        let today = now.with_timezone(&self.timezone).date_naive();
        let input = validation::new_expense(input, today)?;

        let expense = self
            .expenses
            .insert_expense(Expense::pending(actor.id, input, now))
            .await?;
        self.view(expense).await
    }

    /// Approves a pending expense.
    ///
    /// # Errors
    /// * `NotFound` if the expense does not exist
    /// * `IllegalTransition` if it is not pending or the actor is not a manager
    pub async fn approve(&self, expense_id: ExpenseId, actor: Actor) -> Result<ExpenseView, ExpenseError> {
        self.apply(expense_id, actor, ExpenseStatus::Approved, |_, now| {
            StatusChange::Approve {
                approver_id: actor.id,
                approved_at: now,
            }
        })
        .await
    }

    /// Rejects a pending expense with a reason.
    ///
    /// The reason is validated before the expense is even loaded.
    ///
    /// # Errors
    /// * `Validation` if the reason is blank or longer than 500 characters
    /// * `NotFound` if the expense does not exist
    /// * `IllegalTransition` if it is not pending or the actor is not a manager
    pub async fn reject(
        &self,
        expense_id: ExpenseId,
        actor: Actor,
        reason: &str,
    ) -> Result<ExpenseView, ExpenseError> {
        let reason = validation::rejection_reason(reason)?;

        self.apply(expense_id, actor, ExpenseStatus::Rejected, move |_, now| {
            StatusChange::Reject {
                approver_id: actor.id,
                rejected_at: now,
                reason,
            }
        })
        .await
    }

    /// Records payment of an approved expense.
    ///
    /// `paid_amount` defaults to the claimed amount, `paid_date` to now.
    ///
    /// # Errors
    /// * `Validation` if the amount is not positive or the date is in the future
    /// * `NotFound` if the expense does not exist
    /// * `IllegalTransition` if it is not approved or the actor is not a manager
    pub async fn mark_paid(
        &self,
        expense_id: ExpenseId,
        actor: Actor,
        paid_amount: Option<Decimal>,
        paid_date: Option<DateTime<Utc>>,
    ) -> Result<ExpenseView, ExpenseError> {
        let paid_amount = validation::paid_amount(paid_amount)?;
        let paid_date = validation::paid_date(paid_date, Utc::now())?;

        self.apply(expense_id, actor, ExpenseStatus::Reimbursed, move |expense, now| {
            StatusChange::MarkPaid {
                paid_amount: paid_amount.unwrap_or(expense.amount),
                paid_date: paid_date.unwrap_or(now),
            }
        })
        .await
    }

    /// Fetches an expense with owner and approver joined.
    pub async fn get(&self, expense_id: ExpenseId) -> Result<ExpenseView, ExpenseError> {
        let expense = self
            .expenses
            .find_expense(expense_id)
            .await?
            .ok_or(ExpenseError::NotFound(expense_id))?;
        self.view(expense).await
    }

    async fn apply<F>(
        &self,
        expense_id: ExpenseId,
        actor: Actor,
        target: ExpenseStatus,
        build: F,
    ) -> Result<ExpenseView, ExpenseError>
    where
        F: FnOnce(&Expense, DateTime<Utc>) -> StatusChange + Send,
    {
        let expense = self
            .expenses
            .find_expense(expense_id)
            .await?
            .ok_or(ExpenseError::NotFound(expense_id))?;

        PermissionPolicy::authorize_transition(&actor, expense.status, target)
            .map_err(|denied| ExpenseError::illegal(Some(expense_id), denied))?;

        let change = build(&expense, Utc::now());
        match self
            .expenses
            .transition(expense_id, expense.status, &change)
            .await?
        {
            Some(updated) => self.view(updated).await,
            None => Err(self.lost_race(expense_id, actor, target).await),
        }
    }

    /// Explains why a conditional write matched nothing.
    async fn lost_race(&self, expense_id: ExpenseId, actor: Actor, target: ExpenseStatus) -> ExpenseError {
        match self.expenses.find_expense(expense_id).await {
            Ok(Some(current)) => ExpenseError::IllegalTransition {
                expense_id: Some(expense_id),
                from: current.status,
                to: target,
                role: actor.role,
            },
            Ok(None) => ExpenseError::NotFound(expense_id),
            Err(err) => err.into(),
        }
    }

    async fn view(&self, expense: Expense) -> Result<ExpenseView, ExpenseError> {
        let mut ids = vec![expense.user_id];
        if let Some(approver) = expense.approver_id
            && approver != expense.user_id
        {
            ids.push(approver);
        }
        let people = self.users.find_users(&ids).await?;

        let profile = |id: UserId| people.iter().find(|u| u.id == id).map(UserProfile::from);
        let owner = profile(expense.user_id);
        let approver = expense.approver_id.and_then(profile);

        Ok(ExpenseView {
            expense,
            owner,
            approver,
        })
    }
}
