// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints. Everything else under /api expects the token
// issued here as `Authorization: Bearer <token>`.

pub mod login;    // POST /auth/login - verify credentials and get JWT
pub mod register; // POST /auth/register - create customer account

pub use login::login_post;
pub use register::register_post;
