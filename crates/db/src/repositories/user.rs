//! User repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use reimburse_core::expense::User;
use reimburse_core::permission::Role;
use reimburse_core::store::{StoreError, UserStore};
use reimburse_shared::types::UserId;

use crate::entities::users;
use crate::repositories::db_err;

/// User repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        display_name: &str,
        avatar_url: Option<String>,
        role: Role,
        is_approved: bool,
    ) -> Result<User, StoreError> {
        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            display_name: Set(display_name.to_string()),
            avatar_url: Set(avatar_url),
            role: Set(role.into()),
            is_approved: Set(is_approved),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = user.insert(&self.db).await.map_err(db_err)?;
        Ok(user_from_model(model))
    }
}

/// Maps a user row to the domain type.
#[must_use]
pub fn user_from_model(model: users::Model) -> User {
    User {
        id: UserId::from_uuid(model.id),
        display_name: model.display_name,
        avatar_url: model.avatar_url,
        role: model.role.into(),
        is_approved: model.is_approved,
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_from_model))
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(user_from_model).collect())
    }
}
