//! Property-based tests for PermissionPolicy.

use proptest::prelude::*;

use crate::expense::types::ExpenseStatus;
use crate::permission::policy::PermissionPolicy;
use crate::permission::types::Role;

fn arb_status() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Pending),
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::Rejected),
        Just(ExpenseStatus::Reimbursed),
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Employee), Just(Role::Manager)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// can_transition_to agrees with the table for every (from, to, role).
    #[test]
    fn prop_transition_matches_table(
        from in arb_status(),
        to in arb_status(),
        role in arb_role(),
    ) {
        let rule = PermissionPolicy::rule_for(from);
        let expected = rule.allowed.contains(&to)
            && rule.required_role.is_none_or(|required| required == role);
        prop_assert_eq!(PermissionPolicy::can_transition_to(from, to, role), expected);
    }

    /// Nothing leaves a terminal status, whoever asks.
    #[test]
    fn prop_terminal_statuses_are_closed(to in arb_status(), role in arb_role()) {
        prop_assert!(!PermissionPolicy::can_transition_to(ExpenseStatus::Rejected, to, role));
        prop_assert!(!PermissionPolicy::can_transition_to(ExpenseStatus::Reimbursed, to, role));
    }

    /// Employees can never move any expense.
    #[test]
    fn prop_employee_cannot_transition(from in arb_status(), to in arb_status()) {
        prop_assert!(!PermissionPolicy::can_transition_to(from, to, Role::Employee));
    }

    /// No status transitions to itself.
    #[test]
    fn prop_no_self_transition(status in arb_status(), role in arb_role()) {
        prop_assert!(!PermissionPolicy::can_transition_to(status, status, role));
    }

    /// allowed_next_statuses only lists transitions can_transition_to accepts.
    #[test]
    fn prop_allowed_next_consistent(from in arb_status(), role in arb_role()) {
        for to in PermissionPolicy::allowed_next_statuses(from, role) {
            prop_assert!(PermissionPolicy::can_transition_to(from, to, role));
        }
    }
}
