//! Paginated summary reads.
//!
//! Newest first, with `totalPages = ceil(total / limit)`.

use std::sync::Arc;

use reimburse_shared::types::{PageRequest, PageResponse, SummaryId, UserId};

use crate::expense::types::User;
use crate::permission::{Actor, PermissionPolicy};
use crate::store::{SummaryStore, UserStore};
use crate::summary::error::SummaryError;
use crate::summary::types::{Summary, SummaryView};

/// Read side of the summary store.
#[derive(Clone)]
pub struct SummaryQueryService {
    users: Arc<dyn UserStore>,
    summaries: Arc<dyn SummaryStore>,
}

impl SummaryQueryService {
    /// Creates a new query service.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, summaries: Arc<dyn SummaryStore>) -> Self {
        Self { users, summaries }
    }

    /// Lists summaries, optionally restricted to one user.
    pub async fn list_summaries(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> Result<PageResponse<SummaryView>, SummaryError> {
        let (rows, total) = self
            .summaries
            .list_summaries(user_id, page.offset(), page.limit())
            .await?;
        let views = self.join_owners(rows).await?;
        Ok(PageResponse::new(views, page, total))
    }

    /// Lists one user's summaries.
    pub async fn list_user_summaries(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<PageResponse<SummaryView>, SummaryError> {
        self.list_summaries(Some(user_id), page).await
    }

    /// Lists every summary.
    pub async fn list_all_summaries(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<SummaryView>, SummaryError> {
        self.list_summaries(None, page).await
    }

    /// Fetches one summary.
    ///
    /// # Errors
    /// * `NotFound` if no summary has this ID
    pub async fn get_summary(&self, id: SummaryId) -> Result<SummaryView, SummaryError> {
        let summary = self
            .summaries
            .find_summary(id)
            .await?
            .ok_or(SummaryError::NotFound(id))?;
        let owner = self.users.find_user(summary.user_id).await?;
        Ok(SummaryView::new(summary, owner.as_ref()))
    }

    /// Lists what the actor may see.
    ///
    /// Managers see everything, optionally filtered by `user_id`. Employees
    /// only see their own summaries.
    ///
    /// # Errors
    /// * `Forbidden` if an employee asks for another user's summaries
    pub async fn list_visible(
        &self,
        actor: Actor,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> Result<PageResponse<SummaryView>, SummaryError> {
        if PermissionPolicy::can_view_all(actor.role) {
            return self.list_summaries(user_id, page).await;
        }
        match user_id {
            Some(requested) if requested != actor.id => {
                Err(SummaryError::Forbidden { role: actor.role })
            }
            _ => self.list_user_summaries(actor.id, page).await,
        }
    }

    async fn join_owners(&self, rows: Vec<Summary>) -> Result<Vec<SummaryView>, SummaryError> {
        let mut ids: Vec<UserId> = rows.iter().map(|s| s.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let owners: Vec<User> = self.users.find_users(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|summary| {
                let owner = owners.iter().find(|u| u.id == summary.user_id);
                SummaryView::new(summary, owner)
            })
            .collect())
    }
}
