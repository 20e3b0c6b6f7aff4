use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserPatch, UserProfile};
use crate::database::repository::Repository;
use crate::database::store::{StoreResult, UserStore};
use crate::pagination::PageWindow;

const PROFILE_COLUMNS: &str = "id, email, name, role, created_at";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile> {
        let sql = format!(
            "INSERT INTO users (id, email, name, password_hash, role) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(self.pool())
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserProfile>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", PROFILE_COLUMNS);
        let user = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn list_users(&self, window: PageWindow) -> StoreResult<Vec<UserProfile>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at, id OFFSET $1 LIMIT $2",
            PROFILE_COLUMNS
        );
        let users = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(window.skip)
            .bind(window.take)
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Repository::<User>::new("users", self.pool()).count().await
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<UserProfile> {
        let sql = format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.email)
            .bind(patch.role)
            .fetch_optional(self.pool())
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| DatabaseError::not_found("User not found"))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        if Repository::<User>::new("users", self.pool()).delete_id(id).await? {
            Ok(())
        } else {
            Err(DatabaseError::not_found("User not found"))
        }
    }
}
