// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;
use serde::Deserialize;

use crate::handlers::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::users::{self, LoginResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate and receive a bearer token
///
/// Output:
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI...", "expires_in": 86400, "user": { ... } }
/// ```
///
/// Unknown emails and wrong passwords both answer 401 with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResult> {
    let result = users::login(state.store.as_ref(), &state.sessions, &request.email, &request.password).await?;
    Ok(ApiResponse::success(result))
}
