//! Role-based authorization for expense actions.
//!
//! # Modules
//!
//! - `types` - Roles and the acting user
//! - `policy` - Capability predicates and the status transition table

pub mod policy;
pub mod types;

#[cfg(test)]
mod policy_props;

pub use policy::{PermissionPolicy, TransitionDenied, TransitionRule};
pub use types::{Actor, Role};
