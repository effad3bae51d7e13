//! API route handlers, organized by resource
//!
//! - `health`: liveness and storage check
//! - `accounts`: signup, login, current user
//! - `notices`: listing, lookup and admin moderation
//! - `users`: admin user management
//! - `newsletter`: newsletter subscriptions

pub mod accounts;
pub mod health;
pub mod newsletter;
pub mod notices;
pub mod users;
