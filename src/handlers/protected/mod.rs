// handlers/protected/mod.rs - Resource handlers under /api
//
// The session middleware has already resolved the bearer token (if any) into
// a `Session` extension. Handlers pass its identity straight to the service
// layer, which owns every authorization decision.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reviews;
pub mod settings;
pub mod users;
