//! Data models for NoticeHub
//!
//! Each model carries its own Postgres CRUD functions; the memory store
//! works on the same types directly.
//!
//! # Models
//!
//! - `user`: accounts, roles and the public projection
//! - `notice`: notices, moderation status and listing filters
//! - `subscriber`: newsletter subscriptions

pub mod notice;
pub mod subscriber;
pub mod user;
