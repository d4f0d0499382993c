//! Bulk approval.
//!
//! Validation is all-or-nothing. The write is a single conditional update,
//! so a record that left PENDING after validation is left out of the count.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use reimburse_shared::types::ExpenseId;

use crate::expense::error::{ExpenseError, NotPending};
use crate::expense::lifecycle::ExpenseLifecycleService;
use crate::expense::types::ExpenseStatus;
use crate::permission::{Actor, PermissionPolicy};

/// Maximum number of IDs accepted by one bulk request.
pub const MAX_BULK_ITEMS: usize = 100;

/// Outcome of a bulk approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkApproveResult {
    /// Distinct IDs in the request.
    pub requested: usize,
    /// Rows the conditional update actually changed.
    pub approved_count: u64,
}

impl BulkApproveResult {
    /// True when some records changed status between validation and write.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.approved_count < self.requested as u64
    }
}

impl ExpenseLifecycleService {
    /// Approves a batch of pending expenses.
    ///
    /// # Errors
    /// * `InvalidRequest` for an empty list
    /// * `TooManyItems` above [`MAX_BULK_ITEMS`] IDs, duplicates included
    /// * `IllegalTransition` if the actor may not approve
    /// * `NotFoundMany` listing every missing ID, nothing is written
    /// * `InvalidState` listing every non-pending ID and its status, nothing is written
    pub async fn bulk_approve(
        &self,
        expense_ids: &[ExpenseId],
        actor: Actor,
    ) -> Result<BulkApproveResult, ExpenseError> {
        if expense_ids.is_empty() {
            return Err(ExpenseError::InvalidRequest(
                "expense ID list must not be empty".to_string(),
            ));
        }
        if expense_ids.len() > MAX_BULK_ITEMS {
            return Err(ExpenseError::TooManyItems {
                count: expense_ids.len(),
                max: MAX_BULK_ITEMS,
            });
        }

        PermissionPolicy::authorize_transition(&actor, ExpenseStatus::Pending, ExpenseStatus::Approved)
            .map_err(|denied| ExpenseError::illegal(None, denied))?;

        let mut seen = HashSet::with_capacity(expense_ids.len());
        let ids: Vec<ExpenseId> = expense_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let found = self.expenses.find_expenses(&ids).await?;
        let found_ids: HashSet<ExpenseId> = found.iter().map(|e| e.id).collect();

        let missing: Vec<ExpenseId> = ids
            .iter()
            .copied()
            .filter(|id| !found_ids.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(ExpenseError::NotFoundMany { missing });
        }

        let failed: Vec<NotPending> = ids
            .iter()
            .filter_map(|id| found.iter().find(|e| e.id == *id))
            .filter(|e| e.status != ExpenseStatus::Pending)
            .map(|e| NotPending {
                expense_id: e.id,
                status: e.status,
            })
            .collect();
        if !failed.is_empty() {
            return Err(ExpenseError::InvalidState { failed });
        }

        let approved_count = self
            .expenses
            .bulk_approve_pending(&ids, actor.id, Utc::now())
            .await?;

        Ok(BulkApproveResult {
            requested: ids.len(),
            approved_count,
        })
    }
}
