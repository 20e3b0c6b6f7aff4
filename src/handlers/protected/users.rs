// handlers/protected/users.rs - Account administration: /api/users

use axum::extract::{Extension, State};
use uuid::Uuid;

use crate::database::models::{UserPatch, UserProfile};
use crate::handlers::{AppState, PageQuery};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, Deleted, Keyed, Listing, Session};
use crate::services::users::{self, NewAccount};

/// GET /api/users - Paginated user list (admin)
pub async fn users_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing<UserProfile>> {
    let page = users::list_users(state.store.as_ref(), session.identity(), query.request()).await?;
    Ok(ApiResponse::listing("users", page))
}

/// POST /api/users - Create an account with any role (admin)
pub async fn users_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(account): ApiJson<NewAccount>,
) -> ApiResult<Keyed<UserProfile>> {
    let user = users::create_user(state.store.as_ref(), session.identity(), account).await?;
    Ok(ApiResponse::created("user", user))
}

/// GET /api/users/:id - Self or admin
pub async fn user_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Keyed<UserProfile>> {
    let user = users::get_user(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::keyed("user", user))
}

/// PUT /api/users/:id - Self or admin; only admins may change `role`
pub async fn user_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<Keyed<UserProfile>> {
    let user = users::update_user(state.store.as_ref(), session.identity(), id, patch).await?;
    Ok(ApiResponse::keyed("user", user))
}

/// DELETE /api/users/:id (admin)
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    users::delete_user(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::deleted())
}
