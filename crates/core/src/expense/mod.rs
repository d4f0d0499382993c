//! Expense workflow.
//!
//! This module implements the expense lifecycle:
//! - Domain types (expenses, users, status changes)
//! - Input validation
//! - Single-item transitions through [`ExpenseLifecycleService`]
//! - Bulk approval with all-or-nothing validation

pub mod bulk;
pub mod error;
pub mod lifecycle;
pub mod types;
pub mod validation;

pub use bulk::{BulkApproveResult, MAX_BULK_ITEMS};
pub use error::{ExpenseError, NotPending, ValidationError};
pub use lifecycle::ExpenseLifecycleService;
pub use types::{
    Expense, ExpenseStatus, ExpenseView, NewExpense, StatusChange, User, UserProfile,
};
