//! Database layer for NoticeHub
//!
//! Connection pooling and schema migrations for the Postgres backend.
//!
//! # Modules
//!
//! - `pool`: connection pool management with health checks
//! - `migrations`: embedded migration runner
//!
//! # Example
//!
//! ```no_run
//! use noticehub_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     Ok(())
//! }
//! ```

pub mod migrations;
pub mod pool;
