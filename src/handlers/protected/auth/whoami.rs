use axum::extract::{Extension, State};

use crate::database::models::UserProfile;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult, Keyed, Session};
use crate::services::{require_identity, users};

/// GET /api/auth/whoami - Current user, read fresh from the store
///
/// Claims in the token may be stale after a profile or role change, so the
/// profile is looked up by the token's subject.
pub async fn whoami(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Keyed<UserProfile>> {
    let identity = require_identity(session.identity())?;
    let user = users::get_user(state.store.as_ref(), session.identity(), identity.id).await?;
    Ok(ApiResponse::keyed("user", user))
}
