use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::category::with_children;
use crate::database::models::{Category, CategoryDetail, CategoryListing, CategoryPatch, NewCategory};
use crate::database::repository::Repository;
use crate::database::store::{CategoryStore, StoreResult};

#[async_trait]
impl CategoryStore for PgStore {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description, parent_category_id) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.parent_category_id)
        .fetch_one(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn list_categories(&self, include_subcategories: bool) -> StoreResult<Vec<CategoryListing>> {
        if include_subcategories {
            let all = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name, id")
                .fetch_all(self.pool())
                .await?;
            return Ok(with_children(all));
        }

        let top_level = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE parent_category_id IS NULL ORDER BY name, id",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(top_level
            .into_iter()
            .map(|category| CategoryListing {
                category,
                sub_categories: None,
            })
            .collect())
    }

    async fn category_detail(&self, id: Uuid) -> StoreResult<Option<CategoryDetail>> {
        let repository = Repository::<Category>::new("categories", self.pool());
        let Some(category) = repository.select_id(id).await? else {
            return Ok(None);
        };

        let sub_categories = repository
            .select_any_of("parent_category_id", &[id], "name, id")
            .await?;
        let parent_category = match category.parent_category_id {
            Some(parent_id) => repository.select_id(parent_id).await?,
            None => None,
        };

        Ok(Some(CategoryDetail {
            category,
            sub_categories,
            parent_category,
        }))
    }

    async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> StoreResult<Category> {
        let (set_parent, parent) = match patch.parent_category_id {
            Some(parent) => (true, parent),
            None => (false, None),
        };

        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                parent_category_id = CASE WHEN $4 THEN $5 ELSE parent_category_id END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(set_parent)
        .bind(parent)
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Category not found"))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<Category> {
        let mut tx = self.pool().begin().await?;

        let detached = sqlx::query("UPDATE products SET category_id = NULL, updated_at = now() WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE categories SET parent_category_id = NULL, updated_at = now() WHERE parent_category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query_as::<_, Category>("DELETE FROM categories WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| DatabaseError::not_found("Category not found"))?;

        tx.commit().await?;

        tracing::debug!(
            "Deleted category {} and detached {} products",
            id,
            detached.rows_affected()
        );
        Ok(deleted)
    }
}
