//! Core business logic for Reimburse.
//!
//! This crate contains the expense workflow with ZERO web or database
//! dependencies. Persistence goes through the async ports in [`store`].
//!
//! # Modules
//!
//! - `permission` - Roles and the status transition table
//! - `expense` - Expense lifecycle and bulk approval
//! - `summary` - Periodic summaries of pending expenses
//! - `store` - Persistence ports and an in-memory implementation

pub mod expense;
pub mod permission;
pub mod store;
pub mod summary;
