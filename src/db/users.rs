//! Database operations for users.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::user::{Provider, User};

use super::DbPool;

impl DbPool {
    /// Find a user by OAuth identity, creating it on first login.
    ///
    /// A concurrent first login for the same identity loses the insert race on
    /// the unique index; the row the other request created is returned instead.
    pub async fn find_or_create_user(
        &self,
        provider_id: &str,
        provider: Provider,
        email: &str,
        name: &str,
    ) -> AppResult<User> {
        if let Some(existing) = self.find_user_by_provider(provider_id, provider).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = UserActiveModel {
            id: Set(Uuid::new_v4()),
            provider_id: Set(provider_id.to_string()),
            provider: Set(provider.as_str().to_string()),
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(self.connection()).await {
            Ok(inserted) => model_to_user(inserted),
            Err(e) if is_unique_violation(&e) => self
                .find_user_by_provider(provider_id, provider)
                .await?
                .ok_or_else(|| AppError::NotFound("User".to_string())),
            Err(e) => Err(AppError::Database(format!("Failed to create user: {}", e))),
        }
    }

    /// Find a user by OAuth identity.
    pub async fn find_user_by_provider(
        &self,
        provider_id: &str,
        provider: Provider,
    ) -> AppResult<Option<User>> {
        let found = UserEntity::find()
            .filter(user::Column::ProviderId.eq(provider_id))
            .filter(user::Column::Provider.eq(provider.as_str()))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        found.map(model_to_user).transpose()
    }

    /// Get a user by ID. `None` when the user does not exist.
    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        found.map(model_to_user).transpose()
    }

    /// List all users, oldest first.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        models.into_iter().map(model_to_user).collect()
    }

    /// Update profile fields. Fields left as `None` keep their stored value.
    pub async fn update_user(
        &self,
        id: Uuid,
        email: Option<&str>,
        name: Option<&str>,
    ) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let mut active: UserActiveModel = existing.into();
        if let Some(email) = email {
            active.email = Set(email.to_string());
        }
        if let Some(name) = name {
            active.name = Set(name.to_string());
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update user: {}", e)))?;

        model_to_user(updated)
    }

    /// Delete a user. Owned library items go with it through the foreign key cascade.
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }
}

fn model_to_user(m: user::Model) -> AppResult<User> {
    let provider = Provider::parse(&m.provider).ok_or_else(|| {
        AppError::Database(format!("Unknown provider '{}' stored for user {}", m.provider, m.id))
    })?;

    Ok(User {
        id: m.id,
        provider_id: m.provider_id,
        provider,
        email: m.email,
        name: m.name,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}
