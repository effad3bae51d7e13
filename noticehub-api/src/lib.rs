//! # NoticeHub API Server Library
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `bootstrap`: storage selection, admin bootstrap, demo seeding
//! - `config`: configuration management
//! - `error`: error handling and HTTP response mapping
//! - `middleware`: security headers and bearer-token layer
//! - `routes`: API route handlers
//! - `telemetry`: tracing subscriber setup

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod telemetry;
