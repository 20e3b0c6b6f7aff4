// handlers/mod.rs - HTTP handlers
//
// public/    token acquisition, no session required
// protected/ everything under /api; the session may still be anonymous and
//            each service call decides what anonymous callers may do

pub mod protected;
pub mod public;

use std::sync::Arc;

use serde::Deserialize;

use crate::auth::JwtSessions;
use crate::config::config;
use crate::database::Store;
use crate::pagination::{PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<JwtSessions>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, sessions: JwtSessions) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
        }
    }
}

/// `?page=&limit=` on list routes.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// The requested page with its limit capped at the configured maximum.
    pub fn request(&self) -> PageRequest {
        page_request(self.page, self.limit)
    }
}

pub(crate) fn page_request(page: Option<i64>, limit: Option<i64>) -> PageRequest {
    PageRequest::new(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT))
        .clamped(config().pagination.max_limit)
}
