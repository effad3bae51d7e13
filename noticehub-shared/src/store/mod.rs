//! Persistence seam
//!
//! Every handler talks to a [`Store`]. Two implementations exist:
//!
//! - [`memory::MemoryStore`]: in-process state, optionally snapshotted to a
//!   JSON file after each mutation. Suited to single-node and demo setups.
//! - [`postgres::PgStore`]: PostgreSQL through sqlx.
//!
//! Both implement the same record-level semantics: single-record overwrites,
//! last write wins.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    notice::{CreateNotice, Notice, NoticeFields, NoticeFilter, NoticeStatus},
    user::{CreateUser, Role, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule was violated
    #[error("{0}")]
    Conflict(String),

    /// Database query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Snapshot file could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file could not be encoded or decoded
    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn duplicate_email() -> Self {
        StoreError::Conflict("Email already exists".to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations for users, notices and subscribers
///
/// Lookups return `Ok(None)` / `Ok(false)` for missing records; errors are
/// reserved for storage failures and uniqueness conflicts.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name used in logs and the health endpoint
    fn backend(&self) -> &'static str;

    /// Verifies the backing storage is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user; fails with [`StoreError::Conflict`] on a taken email
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// All users, oldest first
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>>;

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_users(&self) -> StoreResult<u64>;

    /// Inserts a pending notice
    async fn create_notice(&self, data: CreateNotice) -> StoreResult<Notice>;

    /// Finds a notice regardless of expiry
    async fn find_notice(&self, id: Uuid) -> StoreResult<Option<Notice>>;

    /// Unexpired notices matching `filter`, newest first
    async fn list_notices(&self, filter: &NoticeFilter, today: NaiveDate)
        -> StoreResult<Vec<Notice>>;

    async fn update_notice(&self, id: Uuid, fields: NoticeFields) -> StoreResult<Option<Notice>>;

    async fn set_notice_status(
        &self,
        id: Uuid,
        status: NoticeStatus,
    ) -> StoreResult<Option<Notice>>;

    async fn delete_notice(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_notices(&self) -> StoreResult<u64>;

    /// Adds a newsletter subscription; returns false if already subscribed
    async fn subscribe(&self, email: &str) -> StoreResult<bool>;
}
