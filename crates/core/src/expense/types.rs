//! Expense domain types.
//!
//! This module defines the expense claim record, its status lifecycle and
//! the audit-stamped status changes that move it through that lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use reimburse_shared::types::{Amount, ExpenseId, UserId};

use crate::permission::Role;

/// Expense status in the approval workflow.
///
/// The valid transitions are:
/// - Pending → Approved (approve, manager)
/// - Pending → Rejected (reject, manager)
/// - Approved → Reimbursed (mark paid, manager)
///
/// Rejected and Reimbursed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    /// Submitted and waiting for a manager.
    Pending,
    /// Approved by a manager, waiting for payment.
    Approved,
    /// Rejected by a manager (terminal).
    Rejected,
    /// Paid out to the employee (terminal).
    Reimbursed,
}

impl ExpenseStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Reimbursed,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Reimbursed => "REIMBURSED",
        }
    }

    /// Parses a status from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "REIMBURSED" => Some(Self::Reimbursed),
            _ => None,
        }
    }

    /// Returns true if the owner may still edit or delete the expense.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Name shown in the UI.
    pub display_name: String,
    /// Avatar image reference.
    pub avatar_url: Option<String>,
    /// Authorization role.
    pub role: Role,
    /// Account activation gate.
    pub is_approved: bool,
}

/// Public projection of a user joined onto expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique identifier.
    pub id: UserId,
    /// Name shown in the UI.
    pub display_name: String,
    /// Avatar image reference.
    pub avatar_url: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// An expense claim.
///
/// Status-dependent fields:
/// - `rejection_reason` is set iff status is Rejected
/// - `paid_amount`/`paid_date` are set iff status is Reimbursed
/// - `approver_id`/`approval_date` are set for every status except Pending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique identifier.
    pub id: ExpenseId,
    /// Owning employee.
    pub user_id: UserId,
    /// Free text description.
    pub description: String,
    /// Claimed amount, strictly positive.
    pub amount: Amount,
    /// Date the expense was incurred.
    pub date: NaiveDate,
    /// Receipt image reference.
    pub image_url: Option<String>,
    /// Current status.
    pub status: ExpenseStatus,
    /// Manager who approved or rejected the claim.
    pub approver_id: Option<UserId>,
    /// When the claim was approved or rejected.
    pub approval_date: Option<DateTime<Utc>>,
    /// Why the claim was rejected.
    pub rejection_reason: Option<String>,
    /// When the claim was paid.
    pub paid_date: Option<DateTime<Utc>>,
    /// How much was paid.
    pub paid_amount: Option<Amount>,
    /// When the claim was submitted.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Builds a freshly submitted, pending expense.
    #[must_use]
    pub fn pending(user_id: UserId, input: NewExpense, now: DateTime<Utc>) -> Self {
        Self {
            id: ExpenseId::new(),
            user_id,
            description: input.description,
            amount: input.amount,
            date: input.date,
            image_url: input.image_url,
            status: ExpenseStatus::Pending,
            approver_id: None,
            approval_date: None,
            rejection_reason: None,
            paid_date: None,
            paid_amount: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the status-dependent fields agree with `status`.
    #[must_use]
    pub fn satisfies_invariants(&self) -> bool {
        let rejected = self.status == ExpenseStatus::Rejected;
        let reimbursed = self.status == ExpenseStatus::Reimbursed;
        let decided = self.status != ExpenseStatus::Pending;

        self.rejection_reason.is_some() == rejected
            && self.paid_amount.is_some() == reimbursed
            && self.paid_date.is_some() == reimbursed
            && self.approver_id.is_some() == decided
    }

    /// Applies a status change in place, stamping its audit fields.
    ///
    /// Callers are expected to have checked the transition first.
    pub fn apply(&mut self, change: &StatusChange, now: DateTime<Utc>) {
        match change {
            StatusChange::Approve {
                approver_id,
                approved_at,
            } => {
                self.approver_id = Some(*approver_id);
                self.approval_date = Some(*approved_at);
            }
            StatusChange::Reject {
                approver_id,
                rejected_at,
                reason,
            } => {
                self.approver_id = Some(*approver_id);
                self.approval_date = Some(*rejected_at);
                self.rejection_reason = Some(reason.clone());
            }
            StatusChange::MarkPaid {
                paid_amount,
                paid_date,
            } => {
                self.paid_amount = Some(*paid_amount);
                self.paid_date = Some(*paid_date);
            }
        }
        self.status = change.new_status();
        self.updated_at = now;
    }
}

/// Input for submitting a new expense claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// Free text description.
    pub description: String,
    /// Claimed amount.
    pub amount: Amount,
    /// Date the expense was incurred.
    pub date: NaiveDate,
    /// Receipt image reference, already uploaded by the caller.
    pub image_url: Option<String>,
}

/// Expense joined with its owner and (when decided) its approver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    /// The expense record.
    #[serde(flatten)]
    pub expense: Expense,
    /// Owning employee.
    pub owner: Option<UserProfile>,
    /// Manager who decided the claim.
    pub approver: Option<UserProfile>,
}

/// A status change with its audit data.
///
/// Each variant captures the resulting status and who/when/why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// Approve a pending expense.
    Approve {
        /// The approving manager.
        approver_id: UserId,
        /// When the expense was approved.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending expense.
    Reject {
        /// The rejecting manager.
        approver_id: UserId,
        /// When the expense was rejected.
        rejected_at: DateTime<Utc>,
        /// Why it was rejected.
        reason: String,
    },
    /// Record payment of an approved expense.
    MarkPaid {
        /// Amount paid out.
        paid_amount: Amount,
        /// When it was paid.
        paid_date: DateTime<Utc>,
    },
}

impl StatusChange {
    /// Returns the status resulting from this change.
    #[must_use]
    pub fn new_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve { .. } => ExpenseStatus::Approved,
            Self::Reject { .. } => ExpenseStatus::Rejected,
            Self::MarkPaid { .. } => ExpenseStatus::Reimbursed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Expense {
        Expense::pending(
            UserId::new(),
            NewExpense {
                description: "Taxi".to_string(),
                amount: Amount::new(dec!(42.00)),
                date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                image_url: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(ExpenseStatus::Pending.as_str(), "PENDING");
        assert_eq!(ExpenseStatus::Approved.as_str(), "APPROVED");
        assert_eq!(ExpenseStatus::Rejected.as_str(), "REJECTED");
        assert_eq!(ExpenseStatus::Reimbursed.as_str(), "REIMBURSED");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ExpenseStatus::parse("pending"), Some(ExpenseStatus::Pending));
        assert_eq!(
            ExpenseStatus::parse("Reimbursed"),
            Some(ExpenseStatus::Reimbursed)
        );
        assert_eq!(ExpenseStatus::parse("paid"), None);
    }

    #[test]
    fn test_status_serde_matches_as_str() {
        for status in ExpenseStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_new_expense_is_pending_and_consistent() {
        let expense = sample();
        assert_eq!(expense.status, ExpenseStatus::Pending);
        assert!(expense.satisfies_invariants());
    }

    #[test]
    fn test_apply_reject_stamps_reason_and_approver() {
        let mut expense = sample();
        let manager = UserId::new();
        let now = Utc::now();
        expense.apply(
            &StatusChange::Reject {
                approver_id: manager,
                rejected_at: now,
                reason: "No receipt".to_string(),
            },
            now,
        );
        assert_eq!(expense.status, ExpenseStatus::Rejected);
        assert_eq!(expense.approver_id, Some(manager));
        assert_eq!(expense.rejection_reason.as_deref(), Some("No receipt"));
        assert!(expense.satisfies_invariants());
    }

    #[test]
    fn test_apply_approve_then_pay_keeps_approver() {
        let mut expense = sample();
        let manager = UserId::new();
        let now = Utc::now();
        expense.apply(
            &StatusChange::Approve {
                approver_id: manager,
                approved_at: now,
            },
            now,
        );
        expense.apply(
            &StatusChange::MarkPaid {
                paid_amount: expense.amount,
                paid_date: now,
            },
            now,
        );
        assert_eq!(expense.status, ExpenseStatus::Reimbursed);
        assert_eq!(expense.approver_id, Some(manager));
        assert_eq!(expense.paid_amount, Some(Amount::new(dec!(42.00))));
        assert!(expense.satisfies_invariants());
    }

    #[test]
    fn test_invariants_detect_stray_reason() {
        let mut expense = sample();
        expense.rejection_reason = Some("stale".to_string());
        assert!(!expense.satisfies_invariants());
    }
}
