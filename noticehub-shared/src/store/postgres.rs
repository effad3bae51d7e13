//! PostgreSQL-backed store
//!
//! Thin adapter over the model CRUD functions. Unique violations on the
//! users table are surfaced as [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::{
    notice::{CreateNotice, Notice, NoticeFields, NoticeFilter, NoticeStatus},
    subscriber::Subscriber,
    user::{CreateUser, Role, User},
};

/// Store backed by a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_user_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::duplicate_email()
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(map_user_insert_error)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        Ok(User::set_role(&self.pool, id, role).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn count_users(&self) -> StoreResult<u64> {
        Ok(User::count(&self.pool).await?.max(0) as u64)
    }

    async fn create_notice(&self, data: CreateNotice) -> StoreResult<Notice> {
        Ok(Notice::create(&self.pool, data).await?)
    }

    async fn find_notice(&self, id: Uuid) -> StoreResult<Option<Notice>> {
        Ok(Notice::find_by_id(&self.pool, id).await?)
    }

    async fn list_notices(
        &self,
        filter: &NoticeFilter,
        today: NaiveDate,
    ) -> StoreResult<Vec<Notice>> {
        Ok(Notice::list(&self.pool, filter, today).await?)
    }

    async fn update_notice(&self, id: Uuid, fields: NoticeFields) -> StoreResult<Option<Notice>> {
        Ok(Notice::update(&self.pool, id, fields).await?)
    }

    async fn set_notice_status(
        &self,
        id: Uuid,
        status: NoticeStatus,
    ) -> StoreResult<Option<Notice>> {
        Ok(Notice::set_status(&self.pool, id, status).await?)
    }

    async fn delete_notice(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Notice::delete(&self.pool, id).await?)
    }

    async fn count_notices(&self) -> StoreResult<u64> {
        Ok(Notice::count(&self.pool).await?.max(0) as u64)
    }

    async fn subscribe(&self, email: &str) -> StoreResult<bool> {
        Ok(Subscriber::create(&self.pool, email).await?.is_some())
    }
}
