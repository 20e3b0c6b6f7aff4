// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::State;

use crate::database::models::UserProfile;
use crate::handlers::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Keyed};
use crate::services::users::{self, Registration};

/// POST /auth/register - Create a customer account
///
/// Input: `{ "email": "...", "password": "...", "name": "..." }`. Self
/// registration always yields the CUSTOMER role; admins create other admins
/// through POST /api/users.
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(registration): ApiJson<Registration>,
) -> ApiResult<Keyed<UserProfile>> {
    let user = users::register(state.store.as_ref(), registration).await?;
    Ok(ApiResponse::created("user", user))
}
