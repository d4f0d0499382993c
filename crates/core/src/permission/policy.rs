//! Permission policy for expense actions and status transitions.
//!
//! Every function here is pure. The transition table is data: adding a
//! status or changing who may move it is an edit to `TRANSITIONS`, not to
//! control flow.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::expense::types::ExpenseStatus;
use crate::permission::types::{Actor, Role};

/// Allowed targets and the role required to move out of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Statuses reachable from this one.
    pub allowed: &'static [ExpenseStatus],
    /// Role the actor must hold, `None` if any role may act.
    pub required_role: Option<Role>,
}

impl TransitionRule {
    const TERMINAL: Self = Self {
        allowed: &[],
        required_role: None,
    };

    /// Returns true if no status is reachable from this one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.allowed.is_empty()
    }
}

static TRANSITIONS: Lazy<HashMap<ExpenseStatus, TransitionRule>> = Lazy::new(|| {
    HashMap::from([
        (
            ExpenseStatus::Pending,
            TransitionRule {
                allowed: &[ExpenseStatus::Approved, ExpenseStatus::Rejected],
                required_role: Some(Role::Manager),
            },
        ),
        (
            ExpenseStatus::Approved,
            TransitionRule {
                allowed: &[ExpenseStatus::Reimbursed],
                required_role: Some(Role::Manager),
            },
        ),
        (ExpenseStatus::Rejected, TransitionRule::TERMINAL),
        (ExpenseStatus::Reimbursed, TransitionRule::TERMINAL),
    ])
});

/// A transition the policy refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{role} may not move an expense from {from} to {to}")]
pub struct TransitionDenied {
    /// Current status.
    pub from: ExpenseStatus,
    /// Requested status.
    pub to: ExpenseStatus,
    /// Role of the actor.
    pub role: Role,
}

/// Stateless permission checks.
pub struct PermissionPolicy;

impl PermissionPolicy {
    /// Returns true for managers.
    #[must_use]
    pub fn is_manager(role: Role) -> bool {
        role == Role::Manager
    }

    /// Returns true for employees.
    #[must_use]
    pub fn is_employee(role: Role) -> bool {
        role == Role::Employee
    }

    /// Any role may submit expenses.
    #[must_use]
    pub fn can_create(_role: Role) -> bool {
        true
    }

    /// Any role may view their own expenses and summaries.
    #[must_use]
    pub fn can_view_own(_role: Role) -> bool {
        true
    }

    /// Only managers may view everyone's expenses and summaries.
    #[must_use]
    pub fn can_view_all(role: Role) -> bool {
        Self::is_manager(role)
    }

    /// Only managers may approve or reject.
    #[must_use]
    pub fn can_approve(role: Role) -> bool {
        Self::is_manager(role)
    }

    /// Only managers may record payment.
    #[must_use]
    pub fn can_mark_paid(role: Role) -> bool {
        Self::is_manager(role)
    }

    /// The owner may edit while the expense is pending. Role does not matter.
    #[must_use]
    pub fn can_edit(_role: Role, is_owner: bool, status: ExpenseStatus) -> bool {
        is_owner && status.is_editable()
    }

    /// The owner may delete while the expense is pending. Role does not matter.
    #[must_use]
    pub fn can_delete(role: Role, is_owner: bool, status: ExpenseStatus) -> bool {
        Self::can_edit(role, is_owner, status)
    }

    /// Looks up the transition rule for a status.
    #[must_use]
    pub fn rule_for(status: ExpenseStatus) -> TransitionRule {
        TRANSITIONS
            .get(&status)
            .copied()
            .unwrap_or(TransitionRule::TERMINAL)
    }

    /// Returns true iff `target` is reachable from `current` and the actor
    /// holds the required role (if any).
    #[must_use]
    pub fn can_transition_to(current: ExpenseStatus, target: ExpenseStatus, role: Role) -> bool {
        let rule = Self::rule_for(current);
        rule.allowed.contains(&target) && rule.required_role.is_none_or(|required| required == role)
    }

    /// Statuses this role may move an expense to from `current`.
    #[must_use]
    pub fn allowed_next_statuses(current: ExpenseStatus, role: Role) -> Vec<ExpenseStatus> {
        Self::rule_for(current)
            .allowed
            .iter()
            .copied()
            .filter(|target| Self::can_transition_to(current, *target, role))
            .collect()
    }

    /// Authorization guard run at the top of every mutating operation.
    pub fn authorize_transition(
        actor: &Actor,
        current: ExpenseStatus,
        target: ExpenseStatus,
    ) -> Result<(), TransitionDenied> {
        if Self::can_transition_to(current, target, actor.role) {
            Ok(())
        } else {
            Err(TransitionDenied {
                from: current,
                to: target,
                role: actor.role,
            })
        }
    }
}
