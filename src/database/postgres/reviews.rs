use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewReview, Review, ReviewAuthor, ReviewPatch, ReviewWithAuthor};
use crate::database::store::{ReviewStore, StoreResult};
use crate::pagination::PageWindow;

#[derive(FromRow)]
struct ReviewRow {
    #[sqlx(flatten)]
    review: Review,
    author_name: Option<String>,
}

impl From<ReviewRow> for ReviewWithAuthor {
    fn from(row: ReviewRow) -> Self {
        Self {
            user: ReviewAuthor {
                id: row.review.user_id,
                name: row.author_name,
            },
            review: row.review,
        }
    }
}

impl PgStore {
    /// Reviews of a product, newest first, with the reviewer's name. The
    /// whole set when `window` is `None`.
    pub(super) async fn reviews_with_authors(
        &self,
        product_id: Uuid,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<ReviewWithAuthor>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT r.*, u.name AS author_name
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(product_id)
        .bind(window.map_or(0, |w| w.skip))
        .bind(window.map(|w| w.take))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(ReviewWithAuthor::from).collect())
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn create_review(&self, review: NewReview) -> StoreResult<Review> {
        sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, user_id, product_id, rating, comment) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(review.user_id)
        .bind(review.product_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(review)
    }

    async fn list_reviews(&self, product_id: Uuid, window: PageWindow) -> StoreResult<Vec<ReviewWithAuthor>> {
        self.reviews_with_authors(product_id, Some(window)).await
    }

    async fn count_reviews(&self, product_id: Uuid) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> StoreResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.rating)
        .bind(patch.comment)
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Review not found"))
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<Review> {
        sqlx::query_as::<_, Review>("DELETE FROM reviews WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::not_found("Review not found"))
    }
}
