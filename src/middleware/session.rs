use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{Identity, SessionResolver};
use crate::handlers::AppState;

/// The caller resolved for this request. Anonymous when `None`.
#[derive(Clone, Debug, Default)]
pub struct Session(pub Option<Identity>);

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Resolve bearer credentials into a [`Session`] extension. Never rejects:
/// what anonymous callers may do is decided per operation.
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let identity = state.sessions.resolve(request.headers());

    if let Some(identity) = &identity {
        tracing::debug!(user_id = %identity.id, role = ?identity.role, "Resolved session");
    }

    request.extensions_mut().insert(Session(identity));
    next.run(request).await
}
