//! Summary domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use reimburse_shared::types::{Amount, ExpenseId, SummaryId, UserId};

use crate::expense::types::{Expense, ExpenseStatus, User};

/// What caused a summary to be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    /// Requested explicitly by a user.
    Manual,
    /// Generated right after an expense submission.
    Submission,
    /// Generated by the recurring scheduler.
    Scheduled,
}

impl TriggerType {
    /// Returns the string representation of the trigger.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Submission => "SUBMISSION",
            Self::Scheduled => "SCHEDULED",
        }
    }

    /// Parses a trigger from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MANUAL" => Some(Self::Manual),
            "SUBMISSION" => Some(Self::Submission),
            "SCHEDULED" => Some(Self::Scheduled),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time copy of an expense embedded in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSnapshot {
    /// Expense ID.
    pub id: ExpenseId,
    /// Description at capture time.
    pub description: String,
    /// Amount at capture time.
    pub amount: Amount,
    /// Incurred date.
    pub date: NaiveDate,
    /// Status at capture time.
    pub status: ExpenseStatus,
}

impl From<&Expense> for ExpenseSnapshot {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            description: expense.description.clone(),
            amount: expense.amount,
            date: expense.date,
            status: expense.status,
        }
    }
}

/// Inclusive reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Window start (inclusive).
    pub start: DateTime<Utc>,
    /// Window end (inclusive).
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Returns true if `instant` lies within the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Immutable snapshot of a user's pending expenses over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Unique identifier.
    pub id: SummaryId,
    /// User the summary was generated for.
    pub user_id: UserId,
    /// Window start.
    pub start_date: DateTime<Utc>,
    /// Window end.
    pub end_date: DateTime<Utc>,
    /// Exact decimal sum of the snapshot amounts.
    pub total_amount: Amount,
    /// Number of snapshots.
    pub expense_count: u32,
    /// Captured expenses, newest expense date first.
    pub expenses: Vec<ExpenseSnapshot>,
    /// What caused the generation.
    pub trigger_type: TriggerType,
    /// When the summary was persisted.
    pub created_at: DateTime<Utc>,
}

/// Summary joined with its owner's display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    /// The persisted summary.
    #[serde(flatten)]
    pub summary: Summary,
    /// Owner display name, `None` if the user record is gone.
    pub user_name: Option<String>,
    /// Owner avatar.
    pub user_avatar: Option<String>,
}

impl SummaryView {
    /// Joins a summary with its (optional) owner.
    #[must_use]
    pub fn new(summary: Summary, owner: Option<&User>) -> Self {
        Self {
            summary,
            user_name: owner.map(|u| u.display_name.clone()),
            user_avatar: owner.and_then(|u| u.avatar_url.clone()),
        }
    }
}
