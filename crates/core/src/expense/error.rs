//! Expense workflow error types.
//!
//! Every variant carries enough detail (IDs, statuses, limits) for a caller
//! to render an actionable message.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use reimburse_shared::AppError;
use reimburse_shared::types::ExpenseId;

use crate::expense::types::ExpenseStatus;
use crate::permission::{Role, TransitionDenied};
use crate::store::StoreError;

/// Malformed caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Rejection reason missing or blank.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Rejection reason too long.
    #[error("Rejection reason is {len} characters, maximum is {max}")]
    RejectionReasonTooLong {
        /// Actual length in characters.
        len: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// Description missing or blank.
    #[error("Description is required")]
    DescriptionRequired,

    /// Description too long.
    #[error("Description is {len} characters, maximum is {max}")]
    DescriptionTooLong {
        /// Actual length in characters.
        len: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// Amount is zero or negative.
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount has more decimal places than a stored amount keeps.
    #[error("Amount {value} has more than {max} decimal places")]
    TooManyDecimalPlaces {
        /// Offending amount.
        value: Decimal,
        /// Allowed decimal places.
        max: u32,
    },

    /// Date lies in the future.
    #[error("Date {date} is in the future (today is {today})")]
    FutureDate {
        /// Offending date.
        date: NaiveDate,
        /// Reference date.
        today: NaiveDate,
    },
}

/// A bulk member that was not pending when the request was validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotPending {
    /// Offending expense.
    pub expense_id: ExpenseId,
    /// Its status at validation time.
    pub status: ExpenseStatus,
}

impl std::fmt::Display for NotPending {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.expense_id, self.status)
    }
}

/// Errors that can occur during expense workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense {0} not found")]
    NotFound(ExpenseId),

    /// One or more expenses of a bulk request do not exist.
    #[error("Expenses not found: {}", join(.missing))]
    NotFoundMany {
        /// Every requested ID absent from the store.
        missing: Vec<ExpenseId>,
    },

    /// The status graph or the actor's role forbids the transition.
    #[error("Illegal transition from {from} to {to} for role {role}{}", expense_suffix(.expense_id))]
    IllegalTransition {
        /// Expense concerned, if the check was about a single record.
        expense_id: Option<ExpenseId>,
        /// Status at check time.
        from: ExpenseStatus,
        /// Requested status.
        to: ExpenseStatus,
        /// Role of the actor.
        role: Role,
    },

    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A bulk request contained non-pending members.
    #[error("Expenses are not pending: {}", join(.failed))]
    InvalidState {
        /// Every fetched expense whose status is not pending, with that status.
        failed: Vec<NotPending>,
    },

    /// A bulk request exceeded the item limit.
    #[error("Too many items: {count} requested, maximum is {max}")]
    TooManyItems {
        /// Number of IDs supplied.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// Request shape is invalid (e.g. empty bulk list).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn expense_suffix(expense_id: &Option<ExpenseId>) -> String {
    expense_id.map_or_else(String::new, |id| format!(" (expense {id})"))
}

impl ExpenseError {
    /// Attaches an expense ID to a policy refusal.
    #[must_use]
    pub fn illegal(expense_id: Option<ExpenseId>, denied: TransitionDenied) -> Self {
        Self::IllegalTransition {
            expense_id,
            from: denied.from,
            to: denied.to,
            role: denied.role,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::TooManyItems { .. } | Self::InvalidRequest(_) => 400,
            Self::NotFound(_) | Self::NotFoundMany { .. } => 404,
            Self::IllegalTransition { .. } | Self::InvalidState { .. } => 409,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::NotFoundMany { .. } => "NOT_FOUND",
            Self::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::TooManyItems { .. } => "TOO_MANY_ITEMS",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::NotFound(_) | ExpenseError::NotFoundMany { .. } => {
                Self::NotFound(err.to_string())
            }
            ExpenseError::IllegalTransition { .. } | ExpenseError::InvalidState { .. } => {
                Self::BusinessRule(err.to_string())
            }
            ExpenseError::Validation(_)
            | ExpenseError::TooManyItems { .. }
            | ExpenseError::InvalidRequest(_) => Self::Validation(err.to_string()),
            ExpenseError::Store(store) => store.into(),
        }
    }
}
