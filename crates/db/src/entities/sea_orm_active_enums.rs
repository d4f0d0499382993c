//! Enum columns.
//!
//! Stored as constrained `VARCHAR` so conditional updates can bind them as
//! plain text.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use reimburse_core::expense::ExpenseStatus as CoreExpenseStatus;
use reimburse_core::permission::Role;
use reimburse_core::summary::TriggerType as CoreTriggerType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
    #[sea_orm(string_value = "MANAGER")]
    Manager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ExpenseStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "REIMBURSED")]
    Reimbursed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TriggerType {
    #[sea_orm(string_value = "MANUAL")]
    Manual,
    #[sea_orm(string_value = "SUBMISSION")]
    Submission,
    #[sea_orm(string_value = "SCHEDULED")]
    Scheduled,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Employee => Self::Employee,
            UserRole::Manager => Self::Manager,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Employee => Self::Employee,
            Role::Manager => Self::Manager,
        }
    }
}

impl From<ExpenseStatus> for CoreExpenseStatus {
    fn from(status: ExpenseStatus) -> Self {
        match status {
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Approved => Self::Approved,
            ExpenseStatus::Rejected => Self::Rejected,
            ExpenseStatus::Reimbursed => Self::Reimbursed,
        }
    }
}

impl From<CoreExpenseStatus> for ExpenseStatus {
    fn from(status: CoreExpenseStatus) -> Self {
        match status {
            CoreExpenseStatus::Pending => Self::Pending,
            CoreExpenseStatus::Approved => Self::Approved,
            CoreExpenseStatus::Rejected => Self::Rejected,
            CoreExpenseStatus::Reimbursed => Self::Reimbursed,
        }
    }
}

impl From<TriggerType> for CoreTriggerType {
    fn from(trigger: TriggerType) -> Self {
        match trigger {
            TriggerType::Manual => Self::Manual,
            TriggerType::Submission => Self::Submission,
            TriggerType::Scheduled => Self::Scheduled,
        }
    }
}

impl From<CoreTriggerType> for TriggerType {
    fn from(trigger: CoreTriggerType) -> Self {
        match trigger {
            CoreTriggerType::Manual => Self::Manual,
            CoreTriggerType::Submission => Self::Submission,
            CoreTriggerType::Scheduled => Self::Scheduled,
        }
    }
}
