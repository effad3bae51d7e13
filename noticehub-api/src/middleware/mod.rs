//! Middleware for the API server
//!
//! - `security`: security response headers
//! - `auth`: bearer-token layer that injects `AuthContext`

pub mod auth;
pub mod security;
