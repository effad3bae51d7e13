//! # NoticeHub Shared Library
//!
//! Domain types, persistence and authentication used by the NoticeHub API
//! server and its migration tool.
//!
//! ## Module Organization
//!
//! - `models`: users, notices, subscribers and their Postgres CRUD
//! - `store`: the storage seam with memory and Postgres implementations
//! - `auth`: password hashing, JWT, auth context and role checks
//! - `db`: connection pool and migrations
//! - `seed`: admin bootstrap and demo data

pub mod auth;
pub mod db;
pub mod models;
pub mod seed;
pub mod store;

/// Current version of the NoticeHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
