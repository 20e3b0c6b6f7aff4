// handlers/protected/categories.rs - /api/categories

use axum::extract::{Extension, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Category, CategoryDetail, CategoryListing, CategoryPatch, NewCategory};
use crate::handlers::AppState;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, Deleted, Keyed, Session};
use crate::services::categories;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub include_subcategories: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<CategoryListing>,
}

/// GET /api/categories - Top-level categories by name. With
/// `?include_subcategories=true`, every category with its direct children.
pub async fn categories_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> ApiResult<CategoryList> {
    let categories =
        categories::list_categories(state.store.as_ref(), session.identity(), query.include_subcategories).await?;
    Ok(ApiResponse::success(CategoryList { categories }))
}

/// POST /api/categories (admin)
pub async fn categories_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(category): ApiJson<NewCategory>,
) -> ApiResult<Keyed<Category>> {
    let category = categories::create_category(state.store.as_ref(), session.identity(), category).await?;
    Ok(ApiResponse::created("category", category))
}

/// GET /api/categories/:id - With parent and direct children
pub async fn category_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Keyed<CategoryDetail>> {
    let category = categories::get_category(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::keyed("category", category))
}

/// PUT /api/categories/:id (admin); `"parent_category_id": null` detaches
pub async fn category_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<CategoryPatch>,
) -> ApiResult<Keyed<Category>> {
    let category = categories::update_category(state.store.as_ref(), session.identity(), id, patch).await?;
    Ok(ApiResponse::keyed("category", category))
}

/// DELETE /api/categories/:id (admin); products and subcategories are detached
pub async fn category_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    categories::delete_category(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::deleted())
}
