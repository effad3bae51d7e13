//! Notice model and database operations
//!
//! A notice is an announcement that moves through a flat moderation status.
//! Any status may be set from any other by an administrator:
//!
//! ```text
//! pending ⇄ approved ⇄ rejected ⇄ pending
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE notice_status AS ENUM ('pending', 'approved', 'rejected');
//!
//! CREATE TABLE notices (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     title TEXT NOT NULL,
//!     content TEXT NOT NULL,
//!     category VARCHAR(64) NOT NULL,
//!     author VARCHAR(255) NOT NULL,
//!     date DATE NOT NULL DEFAULT CURRENT_DATE,
//!     status notice_status NOT NULL DEFAULT 'pending',
//!     expiry DATE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ
//! );
//! ```
//!
//! # Expiry
//!
//! A notice is visible through its expiry date and hidden from the day
//! after. Expired rows stay in storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Moderation state of a notice
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "notice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoticeStatus {
    /// Awaiting moderation
    #[default]
    Pending,

    /// Approved by an administrator
    Approved,

    /// Rejected by an administrator
    Rejected,
}

impl NoticeStatus {
    pub const ALL: [NoticeStatus; 3] = [
        NoticeStatus::Pending,
        NoticeStatus::Approved,
        NoticeStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeStatus::Pending => "pending",
            NoticeStatus::Approved => "approved",
            NoticeStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for NoticeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoticeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NoticeStatus::Pending),
            "approved" => Ok(NoticeStatus::Approved),
            "rejected" => Ok(NoticeStatus::Rejected),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// A posted announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notice {
    /// Unique notice ID
    pub id: Uuid,

    pub title: String,

    pub content: String,

    /// Free-form category such as `academic` or `event`
    pub category: String,

    /// Name (or email) of the submitter
    pub author: String,

    /// Calendar date the notice was posted
    pub date: NaiveDate,

    /// Moderation status
    pub status: NoticeStatus,

    /// Last day on which the notice is shown
    pub expiry: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    /// Set on every edit and status change
    pub updated_at: Option<DateTime<Utc>>,
}

impl Notice {
    /// Whether the notice is past its expiry on `today`
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry.is_some_and(|expiry| expiry < today)
    }
}

/// Editable fields of a notice, shared by create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeFields {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub expiry: Option<NaiveDate>,
}

/// Input for creating a notice
///
/// New notices always start as [`NoticeStatus::Pending`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNotice {
    pub fields: NoticeFields,
    pub author: String,
    pub date: NaiveDate,
}

/// Listing filter
///
/// Expired notices are always excluded; the remaining criteria are optional
/// and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeFilter {
    /// Category match, compared in the lowercase form categories are saved in
    pub category: Option<String>,

    /// Exact status match
    pub status: Option<NoticeStatus>,

    /// Case-insensitive substring over title, content and author
    pub search: Option<String>,
}

impl NoticeFilter {
    /// Builds a filter from raw query values
    ///
    /// Empty values and the literal `all` mean "no filter".
    ///
    /// # Errors
    ///
    /// Returns a message when `status` is not a known status.
    pub fn from_query(
        category: Option<&str>,
        status: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, String> {
        fn meaningful(value: Option<&str>) -> Option<&str> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        }

        let status = meaningful(status).map(str::parse).transpose()?;
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        Ok(Self {
            category: meaningful(category).map(str::to_lowercase),
            status,
            search,
        })
    }

    /// Whether `notice` should be listed on `today`
    pub fn matches(&self, notice: &Notice, today: NaiveDate) -> bool {
        if notice.is_expired_on(today) {
            return false;
        }

        if let Some(category) = &self.category {
            if &notice.category != category {
                return false;
            }
        }

        if let Some(status) = self.status {
            if notice.status != status {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let haystack = format!("{} {} {}", notice.title, notice.content, notice.author)
                .to_lowercase();
            if !haystack.contains(&search.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, an empty string or null
///
/// HTML date inputs submit an empty string when cleared, which maps to no
/// expiry.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", value))),
    }
}

/// Parses a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

const NOTICE_COLUMNS: &str =
    "id, title, content, category, author, date, status, expiry, created_at, updated_at";

impl Notice {
    /// Inserts a pending notice
    pub async fn create(pool: &PgPool, data: CreateNotice) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO notices (title, content, category, author, date, status, expiry) \
             VALUES ($1, $2, $3, $4, $5, 'pending', $6) RETURNING {}",
            NOTICE_COLUMNS
        );

        sqlx::query_as::<_, Notice>(&query)
            .bind(data.fields.title)
            .bind(data.fields.content)
            .bind(data.fields.category)
            .bind(data.author)
            .bind(data.date)
            .bind(data.fields.expiry)
            .fetch_one(pool)
            .await
    }

    /// Finds a notice by ID, expired or not
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM notices WHERE id = $1", NOTICE_COLUMNS);

        sqlx::query_as::<_, Notice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists unexpired notices matching `filter`, newest first
    ///
    /// Mirrors [`NoticeFilter::matches`] in SQL. The search term is matched
    /// with `POSITION` so that `%` and `_` need no escaping.
    pub async fn list(
        pool: &PgPool,
        filter: &NoticeFilter,
        today: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM notices \
             WHERE (expiry IS NULL OR expiry >= $1) \
               AND ($2::text IS NULL OR category = $2) \
               AND ($3::notice_status IS NULL OR status = $3) \
               AND ($4::text IS NULL OR POSITION($4 IN LOWER(title || ' ' || content || ' ' || author)) > 0) \
             ORDER BY created_at DESC",
            NOTICE_COLUMNS
        );

        sqlx::query_as::<_, Notice>(&query)
            .bind(today)
            .bind(filter.category.as_deref())
            .bind(filter.status)
            .bind(filter.search.as_deref().map(str::to_lowercase))
            .fetch_all(pool)
            .await
    }

    /// Replaces the editable fields
    ///
    /// Returns None if the notice doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        fields: NoticeFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE notices \
             SET title = $2, content = $3, category = $4, expiry = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            NOTICE_COLUMNS
        );

        sqlx::query_as::<_, Notice>(&query)
            .bind(id)
            .bind(fields.title)
            .bind(fields.content)
            .bind(fields.category)
            .bind(fields.expiry)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: NoticeStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE notices SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            NOTICE_COLUMNS
        );

        sqlx::query_as::<_, Notice>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notices")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
