//! Expense repository for database operations.
//!
//! Status writes are `UPDATE ... WHERE id = $1 AND status = $2`. The row
//! count returned by PostgreSQL is the only signal of who won a race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use reimburse_core::expense::{Expense, ExpenseStatus, StatusChange};
use reimburse_core::store::{ExpenseStore, StoreError};
use reimburse_shared::types::{Amount, ExpenseId, UserId};

use crate::entities::expenses;
use crate::entities::sea_orm_active_enums::ExpenseStatus as DbExpenseStatus;
use crate::repositories::db_err;

/// Expense repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Maps an expense row to the domain type.
#[must_use]
pub fn expense_from_model(model: expenses::Model) -> Expense {
    Expense {
        id: ExpenseId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        description: model.description,
        amount: Amount::new(model.amount),
        date: model.date,
        image_url: model.image_url,
        status: model.status.into(),
        approver_id: model.approver_id.map(UserId::from_uuid),
        approval_date: model.approval_date.map(|d| d.with_timezone(&Utc)),
        rejection_reason: model.rejection_reason,
        paid_date: model.paid_date.map(|d| d.with_timezone(&Utc)),
        paid_amount: model.paid_amount.map(Amount::new),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn expense_to_active_model(expense: &Expense) -> expenses::ActiveModel {
    expenses::ActiveModel {
        id: Set(expense.id.into_inner()),
        user_id: Set(expense.user_id.into_inner()),
        description: Set(expense.description.clone()),
        amount: Set(expense.amount.value()),
        date: Set(expense.date),
        image_url: Set(expense.image_url.clone()),
        status: Set(expense.status.into()),
        approver_id: Set(expense.approver_id.map(UserId::into_inner)),
        approval_date: Set(expense.approval_date.map(Into::into)),
        rejection_reason: Set(expense.rejection_reason.clone()),
        paid_date: Set(expense.paid_date.map(Into::into)),
        paid_amount: Set(expense.paid_amount.map(Amount::value)),
        created_at: Set(expense.created_at.into()),
        updated_at: Set(expense.updated_at.into()),
    }
}

/// Columns a status change writes. Everything else stays `NotSet`.
fn change_to_active_model(change: &StatusChange, now: DateTime<Utc>) -> expenses::ActiveModel {
    let mut model = expenses::ActiveModel {
        status: Set(change.new_status().into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    match change {
        StatusChange::Approve {
            approver_id,
            approved_at,
        } => {
            model.approver_id = Set(Some(approver_id.into_inner()));
            model.approval_date = Set(Some((*approved_at).into()));
        }
        StatusChange::Reject {
            approver_id,
            rejected_at,
            reason,
        } => {
            model.approver_id = Set(Some(approver_id.into_inner()));
            model.approval_date = Set(Some((*rejected_at).into()));
            model.rejection_reason = Set(Some(reason.clone()));
        }
        StatusChange::MarkPaid {
            paid_amount,
            paid_date,
        } => {
            model.paid_amount = Set(Some(paid_amount.value()));
            model.paid_date = Set(Some((*paid_date).into()));
        }
    }
    model
}

fn uuids(ids: &[ExpenseId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_inner()).collect()
}

#[async_trait]
impl ExpenseStore for ExpenseRepository {
    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        let model = expenses::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(expense_from_model))
    }

    async fn find_expenses(&self, ids: &[ExpenseId]) -> Result<Vec<Expense>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = expenses::Entity::find()
            .filter(expenses::Column::Id.is_in(uuids(ids)))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(expense_from_model).collect())
    }

    async fn insert_expense(&self, expense: Expense) -> Result<Expense, StoreError> {
        let model = expense_to_active_model(&expense)
            .insert(&self.db)
            .await
            .map_err(db_err)?;

        debug!(expense_id = %expense.id, user_id = %expense.user_id, "Expense submitted");
        Ok(expense_from_model(model))
    }

    async fn transition(
        &self,
        id: ExpenseId,
        expected: ExpenseStatus,
        change: &StatusChange,
    ) -> Result<Option<Expense>, StoreError> {
        let updated = expenses::Entity::update_many()
            .set(change_to_active_model(change, Utc::now()))
            .filter(expenses::Column::Id.eq(id.into_inner()))
            .filter(expenses::Column::Status.eq(DbExpenseStatus::from(expected)))
            .exec_with_returning(&self.db)
            .await
            .map_err(db_err)?;

        match updated.into_iter().next() {
            Some(model) => {
                debug!(
                    expense_id = %id,
                    from = %expected,
                    to = %change.new_status(),
                    "Expense status changed"
                );
                Ok(Some(expense_from_model(model)))
            }
            None => {
                warn!(
                    expense_id = %id,
                    expected = %expected,
                    "Conditional status update matched no row"
                );
                Ok(None)
            }
        }
    }

    async fn bulk_approve_pending(
        &self,
        ids: &[ExpenseId],
        approver_id: UserId,
        approved_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let change = StatusChange::Approve {
            approver_id,
            approved_at,
        };

        let result = expenses::Entity::update_many()
            .set(change_to_active_model(&change, approved_at))
            .filter(expenses::Column::Id.is_in(uuids(ids)))
            .filter(expenses::Column::Status.eq(DbExpenseStatus::Pending))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let mut unique = uuids(ids);
        unique.sort_unstable();
        unique.dedup();
        if result.rows_affected < unique.len() as u64 {
            warn!(
                requested = unique.len(),
                approved = result.rows_affected,
                "Bulk approval skipped expenses that left PENDING"
            );
        }
        info!(approver_id = %approver_id, approved = result.rows_affected, "Bulk approval applied");
        Ok(result.rows_affected)
    }

    async fn pending_for_user_between(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Expense>, StoreError> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id.into_inner()))
            .filter(expenses::Column::Status.eq(DbExpenseStatus::Pending))
            .filter(expenses::Column::CreatedAt.between(start, end))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(expense_from_model).collect())
    }

    async fn users_with_pending(&self) -> Result<Vec<UserId>, StoreError> {
        let owners: Vec<Uuid> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::UserId)
            .distinct()
            .filter(expenses::Column::Status.eq(DbExpenseStatus::Pending))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(owners.into_iter().map(UserId::from_uuid).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::ActiveValue;

    use reimburse_core::expense::NewExpense;

    fn sample() -> Expense {
        Expense::pending(
            UserId::new(),
            NewExpense {
                description: "Parking".to_string(),
                amount: Amount::new(dec!(12.00)),
                date: NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
                image_url: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_active_model_round_trip() {
        let expense = sample();
        let active = expense_to_active_model(&expense);
        let model = expenses::Model {
            id: active.id.unwrap(),
            user_id: active.user_id.unwrap(),
            description: active.description.unwrap(),
            amount: active.amount.unwrap(),
            date: active.date.unwrap(),
            image_url: active.image_url.unwrap(),
            status: active.status.unwrap(),
            approver_id: active.approver_id.unwrap(),
            approval_date: active.approval_date.unwrap(),
            rejection_reason: active.rejection_reason.unwrap(),
            paid_date: active.paid_date.unwrap(),
            paid_amount: active.paid_amount.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };
        assert_eq!(expense_from_model(model), expense);
    }

    #[test]
    fn test_approve_change_only_sets_approval_columns() {
        let approver = UserId::new();
        let now = Utc::now();
        let model = change_to_active_model(
            &StatusChange::Approve {
                approver_id: approver,
                approved_at: now,
            },
            now,
        );
        assert_eq!(model.status, ActiveValue::Set(DbExpenseStatus::Approved));
        assert_eq!(model.approver_id, ActiveValue::Set(Some(approver.into_inner())));
        assert!(matches!(model.rejection_reason, ActiveValue::NotSet));
        assert!(matches!(model.paid_amount, ActiveValue::NotSet));
        assert!(matches!(model.description, ActiveValue::NotSet));
    }

    #[test]
    fn test_mark_paid_change_sets_payment_columns() {
        let now = Utc::now();
        let model = change_to_active_model(
            &StatusChange::MarkPaid {
                paid_amount: Amount::new(dec!(99.99)),
                paid_date: now,
            },
            now,
        );
        assert_eq!(model.status, ActiveValue::Set(DbExpenseStatus::Reimbursed));
        assert_eq!(model.paid_amount, ActiveValue::Set(Some(dec!(99.99))));
        assert!(matches!(model.approver_id, ActiveValue::NotSet));
    }
}
