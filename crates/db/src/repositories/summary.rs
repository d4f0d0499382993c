//! Summary repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use reimburse_core::store::{StoreError, SummaryStore};
use reimburse_core::summary::{ExpenseSnapshot, Summary};
use reimburse_shared::types::{Amount, SummaryId, UserId};

use crate::entities::summaries;
use crate::repositories::db_err;

/// Summary repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct SummaryRepository {
    db: DatabaseConnection,
}

impl SummaryRepository {
    /// Creates a new summary repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn serialization(err: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(err.to_string())
}

/// Maps a summary row to the domain type, decoding the snapshot column.
///
/// # Errors
///
/// Returns `Serialization` if the stored snapshots or count are malformed.
pub fn summary_from_model(model: summaries::Model) -> Result<Summary, StoreError> {
    let expenses: Vec<ExpenseSnapshot> =
        serde_json::from_value(model.expenses).map_err(serialization)?;

    Ok(Summary {
        id: SummaryId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        start_date: model.start_date.with_timezone(&Utc),
        end_date: model.end_date.with_timezone(&Utc),
        total_amount: Amount::new(model.total_amount),
        expense_count: u32::try_from(model.expense_count).map_err(serialization)?,
        expenses,
        trigger_type: model.trigger_type.into(),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn summary_to_active_model(summary: &Summary) -> Result<summaries::ActiveModel, StoreError> {
    Ok(summaries::ActiveModel {
        id: Set(summary.id.into_inner()),
        user_id: Set(summary.user_id.into_inner()),
        start_date: Set(summary.start_date.into()),
        end_date: Set(summary.end_date.into()),
        total_amount: Set(summary.total_amount.value()),
        expense_count: Set(i32::try_from(summary.expense_count).map_err(serialization)?),
        expenses: Set(serde_json::to_value(&summary.expenses).map_err(serialization)?),
        trigger_type: Set(summary.trigger_type.into()),
        created_at: Set(summary.created_at.into()),
    })
}

#[async_trait]
impl SummaryStore for SummaryRepository {
    async fn insert_summary(&self, summary: Summary) -> Result<Summary, StoreError> {
        let model = summary_to_active_model(&summary)?
            .insert(&self.db)
            .await
            .map_err(db_err)?;

        info!(
            summary_id = %summary.id,
            user_id = %summary.user_id,
            expense_count = summary.expense_count,
            total = %summary.total_amount,
            trigger = %summary.trigger_type,
            "Summary persisted"
        );
        summary_from_model(model)
    }

    async fn find_summary(&self, id: SummaryId) -> Result<Option<Summary>, StoreError> {
        summaries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(summary_from_model)
            .transpose()
    }

    async fn list_summaries(
        &self,
        user_id: Option<UserId>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Summary>, u64), StoreError> {
        let mut query = summaries::Entity::find();
        if let Some(user_id) = user_id {
            query = query.filter(summaries::Column::UserId.eq(user_id.into_inner()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(summaries::Column::CreatedAt)
            .order_by_desc(summaries::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let rows = models
            .into_iter()
            .map(summary_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use reimburse_core::expense::ExpenseStatus;
    use reimburse_core::summary::TriggerType;
    use reimburse_shared::types::ExpenseId;

    fn sample() -> Summary {
        let now = Utc::now();
        Summary {
            id: SummaryId::new(),
            user_id: UserId::new(),
            start_date: now - chrono::Duration::days(2),
            end_date: now,
            total_amount: Amount::new(dec!(300.75)),
            expense_count: 2,
            expenses: vec![
                ExpenseSnapshot {
                    id: ExpenseId::new(),
                    description: "Hotel".to_string(),
                    amount: Amount::new(dec!(200.25)),
                    date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
                    status: ExpenseStatus::Pending,
                },
                ExpenseSnapshot {
                    id: ExpenseId::new(),
                    description: "Dinner".to_string(),
                    amount: Amount::new(dec!(100.50)),
                    date: NaiveDate::from_ymd_opt(2026, 10, 13).unwrap(),
                    status: ExpenseStatus::Pending,
                },
            ],
            trigger_type: TriggerType::Scheduled,
            created_at: now,
        }
    }

    fn to_model(active: summaries::ActiveModel) -> summaries::Model {
        summaries::Model {
            id: active.id.unwrap(),
            user_id: active.user_id.unwrap(),
            start_date: active.start_date.unwrap(),
            end_date: active.end_date.unwrap(),
            total_amount: active.total_amount.unwrap(),
            expense_count: active.expense_count.unwrap(),
            expenses: active.expenses.unwrap(),
            trigger_type: active.trigger_type.unwrap(),
            created_at: active.created_at.unwrap(),
        }
    }

    #[test]
    fn test_snapshots_survive_the_json_column() {
        let summary = sample();
        let model = to_model(summary_to_active_model(&summary).unwrap());
        assert!(model.expenses.is_array());
        assert_eq!(model.expenses[0]["amount"], "200.25");
        assert_eq!(summary_from_model(model).unwrap(), summary);
    }

    #[test]
    fn test_malformed_snapshots_are_a_serialization_error() {
        let mut model = to_model(summary_to_active_model(&sample()).unwrap());
        model.expenses = serde_json::json!({"not": "a list"});
        assert!(matches!(
            summary_from_model(model),
            Err(StoreError::Serialization(_))
        ));
    }
}
