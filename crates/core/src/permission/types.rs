//! Roles and the authenticated caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use reimburse_shared::types::UserId;

/// User role.
///
/// Unlike an ordered hierarchy, the two roles are disjoint: a manager is
/// not "more" of an employee when it comes to owning expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Submits and tracks their own expenses.
    Employee,
    /// Reviews, approves and pays out expenses.
    Manager,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EMPLOYEE" => Some(Self::Employee),
            "MANAGER" => Some(Self::Manager),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "EMPLOYEE",
            Self::Manager => "MANAGER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The already-authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Who is acting.
    pub id: UserId,
    /// Their resolved role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Shorthand for an employee actor.
    #[must_use]
    pub const fn employee(id: UserId) -> Self {
        Self::new(id, Role::Employee)
    }

    /// Shorthand for a manager actor.
    #[must_use]
    pub const fn manager(id: UserId) -> Self {
        Self::new(id, Role::Manager)
    }
}
