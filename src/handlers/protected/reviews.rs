// handlers/protected/reviews.rs - /api/reviews
//
// Listing lives under GET /api/products/:id/reviews.

use axum::extract::{Extension, State};
use uuid::Uuid;

use crate::database::models::{NewReview, Review, ReviewPatch};
use crate::handlers::AppState;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted, Keyed, Session};
use crate::services::reviews;

/// POST /api/reviews - `user_id` must be the caller
pub async fn reviews_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(review): ApiJson<NewReview>,
) -> ApiResult<Keyed<Review>> {
    let review = reviews::create_review(state.store.as_ref(), session.identity(), review).await?;
    Ok(ApiResponse::created("review", review))
}

/// PUT /api/reviews/:id - Author or admin
pub async fn review_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ReviewPatch>,
) -> ApiResult<Keyed<Review>> {
    let review = reviews::update_review(state.store.as_ref(), session.identity(), id, patch).await?;
    Ok(ApiResponse::keyed("review", review))
}

/// DELETE /api/reviews/:id - Author or admin
pub async fn review_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    reviews::delete_review(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::deleted())
}
