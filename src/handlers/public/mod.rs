// handlers/public/mod.rs - Public handlers (no session required)
//
// Route prefix: /auth/*

pub mod auth;
