//! Authentication and authorization
//!
//! # Modules
//!
//! - [`password`]: Argon2id hashing and strength checks
//! - [`jwt`]: HS256 token issuance and validation
//! - [`middleware`]: bearer-token extraction and [`middleware::AuthContext`]
//! - [`authorization`]: role checks used by handlers
//!
//! # Example
//!
//! ```
//! use noticehub_shared::auth::password::{hash_password, verify_password, HashParams};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = HashParams { memory_kib: 1024, iterations: 1, parallelism: 1 };
//! let hash = hash_password("Secret@1", &params)?;
//! assert!(verify_password("Secret@1", &hash)?);
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
