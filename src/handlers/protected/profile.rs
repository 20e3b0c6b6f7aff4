// handlers/protected/profile.rs - The caller's own account: /api/user/*

use axum::extract::{Extension, State};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Address, AddressPatch, NewAddress, UserProfile};
use crate::handlers::AppState;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted, Keyed, Session};
use crate::services::users::ProfilePatch;
use crate::services::{addresses, require_identity, users};

/// PUT /api/user/profile - Change own name and/or email
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(patch): ApiJson<ProfilePatch>,
) -> ApiResult<Keyed<UserProfile>> {
    let user = users::update_profile(state.store.as_ref(), session.identity(), patch).await?;
    Ok(ApiResponse::keyed("user", user))
}

#[derive(Debug, Serialize)]
pub struct AddressList {
    pub addresses: Vec<Address>,
}

/// GET /api/user/addresses - Own addresses, oldest first
pub async fn addresses_get(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<AddressList> {
    let me = require_identity(session.identity())?;
    let addresses = addresses::list_addresses(state.store.as_ref(), session.identity(), me.id).await?;
    Ok(ApiResponse::success(AddressList { addresses }))
}

/// POST /api/user/addresses - Add an address to own account
pub async fn addresses_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(address): ApiJson<NewAddress>,
) -> ApiResult<Keyed<Address>> {
    let me = require_identity(session.identity())?;
    let address = addresses::create_address(state.store.as_ref(), session.identity(), me.id, address).await?;
    Ok(ApiResponse::created("address", address))
}

/// PUT /api/user/addresses/:id
pub async fn address_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AddressPatch>,
) -> ApiResult<Keyed<Address>> {
    let address = addresses::update_address(state.store.as_ref(), session.identity(), id, patch).await?;
    Ok(ApiResponse::keyed("address", address))
}

/// DELETE /api/user/addresses/:id
pub async fn address_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    addresses::delete_address(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::deleted())
}
