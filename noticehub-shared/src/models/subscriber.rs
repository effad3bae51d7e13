//! Newsletter subscribers
//!
//! ```sql
//! CREATE TABLE subscribers (
//!     email VARCHAR(255) PRIMARY KEY,
//!     subscribed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::user::normalize_email;

/// A newsletter subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscriber {
    /// Lowercased email address
    pub email: String,

    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    /// Adds a subscription
    ///
    /// Returns None when the address was already subscribed.
    pub async fn create(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO subscribers (email)
            VALUES ($1)
            ON CONFLICT (email) DO NOTHING
            RETURNING email, subscribed_at
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
    }
}
