//! In-memory store with optional JSON snapshot
//!
//! State lives behind a single `RwLock`. When a snapshot path is configured
//! the whole state is rewritten to disk after each successful mutation
//! (write to a temporary sibling, then rename), and reloaded on startup.
//!
//! # Example
//!
//! ```
//! use noticehub_shared::models::user::{CreateUser, Role};
//! use noticehub_shared::store::{MemoryStore, Store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! store
//!     .create_user(CreateUser::new("Alice", "alice@example.com", "$argon2id$...", Role::User))
//!     .await?;
//! assert!(store.find_user_by_email("ALICE@example.com").await?.is_some());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    notice::{CreateNotice, Notice, NoticeFields, NoticeFilter, NoticeStatus},
    subscriber::Subscriber,
    user::{normalize_email, CreateUser, Role, User},
};

/// Everything the memory store holds, as written to the snapshot file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub notices: Vec<Notice>,

    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Snapshot>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty store that is never written to disk
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store persisted at `path`
    ///
    /// A missing file starts an empty store; the file is created on the
    /// first mutation.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot found, starting empty");
                Snapshot::default()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        info!(
            path = %path.display(),
            users = snapshot.users.len(),
            notices = snapshot.notices.len(),
            "Memory store loaded"
        );

        Ok(Self {
            state: RwLock::new(snapshot),
            snapshot_path: Some(path),
        })
    }

    async fn persist(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!(path = %path.display(), "Snapshot written");
        Ok(())
    }

    /// Applies `apply` under the write lock
    ///
    /// `apply` returns `None` when it changed nothing. With a snapshot path
    /// the change is made on a copy, and the copy replaces the live state
    /// only once it has been written, so a failed write leaves the store
    /// untouched.
    async fn mutate<T, F>(&self, apply: F) -> StoreResult<Option<T>>
    where
        F: FnOnce(&mut Snapshot) -> Option<T> + Send,
        T: Send,
    {
        let mut state = self.state.write().await;

        if self.snapshot_path.is_none() {
            return Ok(apply(&mut *state));
        }

        let mut next = (*state).clone();
        let Some(out) = apply(&mut next) else {
            return Ok(None);
        };
        self.persist(&next).await?;
        *state = next;

        Ok(Some(out))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: normalize_email(&data.email),
            password_hash: data.password_hash,
            role: data.role,
            created_at: Utc::now(),
        };

        let inserted = user.clone();
        self.mutate(move |state| {
            if state.users.iter().any(|u| u.email == inserted.email) {
                return None;
            }
            state.users.push(inserted);
            Some(())
        })
        .await?
        .ok_or_else(StoreError::duplicate_email)?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.users.clone())
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        self.mutate(move |state| {
            let user = state.users.iter_mut().find(|u| u.id == id)?;
            user.role = role;
            Some(user.clone())
        })
        .await
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let removed = self
            .mutate(move |state| {
                let index = state.users.iter().position(|u| u.id == id)?;
                Some(state.users.remove(index))
            })
            .await?;

        Ok(removed.is_some())
    }

    async fn count_users(&self) -> StoreResult<u64> {
        Ok(self.state.read().await.users.len() as u64)
    }

    async fn create_notice(&self, data: CreateNotice) -> StoreResult<Notice> {
        let notice = Notice {
            id: Uuid::new_v4(),
            title: data.fields.title,
            content: data.fields.content,
            category: data.fields.category,
            author: data.author,
            date: data.date,
            status: NoticeStatus::Pending,
            expiry: data.fields.expiry,
            created_at: Utc::now(),
            updated_at: None,
        };

        let inserted = notice.clone();
        self.mutate(move |state| {
            state.notices.push(inserted);
            Some(())
        })
        .await?;

        Ok(notice)
    }

    async fn find_notice(&self, id: Uuid) -> StoreResult<Option<Notice>> {
        let state = self.state.read().await;
        Ok(state.notices.iter().find(|n| n.id == id).cloned())
    }

    async fn list_notices(
        &self,
        filter: &NoticeFilter,
        today: NaiveDate,
    ) -> StoreResult<Vec<Notice>> {
        let state = self.state.read().await;

        // reversed first so equal timestamps keep newest-inserted first
        let mut notices: Vec<Notice> = state
            .notices
            .iter()
            .rev()
            .filter(|n| filter.matches(n, today))
            .cloned()
            .collect();
        notices.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(notices)
    }

    async fn update_notice(&self, id: Uuid, fields: NoticeFields) -> StoreResult<Option<Notice>> {
        self.mutate(move |state| {
            let notice = state.notices.iter_mut().find(|n| n.id == id)?;
            notice.title = fields.title;
            notice.content = fields.content;
            notice.category = fields.category;
            notice.expiry = fields.expiry;
            notice.updated_at = Some(Utc::now());
            Some(notice.clone())
        })
        .await
    }

    async fn set_notice_status(
        &self,
        id: Uuid,
        status: NoticeStatus,
    ) -> StoreResult<Option<Notice>> {
        self.mutate(move |state| {
            let notice = state.notices.iter_mut().find(|n| n.id == id)?;
            notice.status = status;
            notice.updated_at = Some(Utc::now());
            Some(notice.clone())
        })
        .await
    }

    async fn delete_notice(&self, id: Uuid) -> StoreResult<bool> {
        let removed = self
            .mutate(move |state| {
                let index = state.notices.iter().position(|n| n.id == id)?;
                Some(state.notices.remove(index))
            })
            .await?;

        Ok(removed.is_some())
    }

    async fn count_notices(&self) -> StoreResult<u64> {
        Ok(self.state.read().await.notices.len() as u64)
    }

    async fn subscribe(&self, email: &str) -> StoreResult<bool> {
        let email = normalize_email(email);

        let added = self
            .mutate(move |state| {
                if state.subscribers.iter().any(|s| s.email == email) {
                    return None;
                }
                state.subscribers.push(Subscriber {
                    email,
                    subscribed_at: Utc::now(),
                });
                Some(())
            })
            .await?;

        Ok(added.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn fields(title: &str, category: &str, expiry: Option<NaiveDate>) -> NoticeFields {
        NoticeFields {
            title: title.to_string(),
            content: format!("{} details", title),
            category: category.to_string(),
            expiry,
        }
    }

    fn new_notice(title: &str, category: &str, expiry: Option<NaiveDate>) -> CreateNotice {
        CreateNotice {
            fields: fields(title, category, expiry),
            author: "Academic Office".to_string(),
            date: today(),
        }
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let store = MemoryStore::new();
        store
            .create_user(CreateUser::new("Alice", "alice@example.com", "h", Role::User))
            .await
            .unwrap();

        let err = store
            .create_user(CreateUser::new("Other", "ALICE@example.com", "h", Role::User))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_user_role_and_delete() {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser::new("Alice", "alice@example.com", "h", Role::User))
            .await
            .unwrap();

        let promoted = store.set_user_role(user.id, Role::Admin).await.unwrap().unwrap();
        assert_eq!(promoted.role, Role::Admin);
        assert!(store.set_user_role(Uuid::new_v4(), Role::Admin).await.unwrap().is_none());

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(!store.delete_user(user.id).await.unwrap());
        assert!(store.find_user_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notice_lifecycle() {
        let store = MemoryStore::new();
        let notice = store
            .create_notice(new_notice("Sports Day", "event", None))
            .await
            .unwrap();
        assert_eq!(notice.status, NoticeStatus::Pending);
        assert!(notice.updated_at.is_none());

        let approved = store
            .set_notice_status(notice.id, NoticeStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, NoticeStatus::Approved);
        assert!(approved.updated_at.is_some());

        let edited = store
            .update_notice(notice.id, fields("Annual Sports Day", "event", None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.title, "Annual Sports Day");
        assert_eq!(edited.status, NoticeStatus::Approved);

        assert!(store.delete_notice(notice.id).await.unwrap());
        assert!(store.find_notice(notice.id).await.unwrap().is_none());
        assert!(store
            .update_notice(notice.id, fields("x", "event", None))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_notices_filters_and_orders() {
        let store = MemoryStore::new();
        let yesterday = today().pred_opt().unwrap();

        store.create_notice(new_notice("First", "academic", None)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .create_notice(new_notice("Expired", "academic", Some(yesterday)))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .create_notice(new_notice("Last Day", "event", Some(today())))
            .await
            .unwrap();

        let all = store
            .list_notices(&NoticeFilter::default(), today())
            .await
            .unwrap();
        let titles: Vec<&str> = all.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Last Day", "First"]);

        let academic = NoticeFilter {
            category: Some("academic".to_string()),
            ..Default::default()
        };
        let listed = store.list_notices(&academic, today()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "First");

        // expired rows are hidden, not purged
        assert_eq!(store.count_notices().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_subscribe_once() {
        let store = MemoryStore::new();
        assert!(store.subscribe("reader@example.com").await.unwrap());
        assert!(!store.subscribe(" Reader@Example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noticehub.json");

        let store = MemoryStore::open(&path).await.unwrap();
        let user = store
            .create_user(CreateUser::new("Alice", "alice@example.com", "h", Role::User))
            .await
            .unwrap();
        store
            .create_notice(new_notice("Library Maintenance", "administrative", None))
            .await
            .unwrap();
        store.subscribe("reader@example.com").await.unwrap();
        assert!(path.exists());

        let reopened = MemoryStore::open(&path).await.unwrap();
        assert_eq!(reopened.find_user_by_id(user.id).await.unwrap().unwrap().email, user.email);
        assert_eq!(reopened.count_notices().await.unwrap(), 1);
        assert!(!reopened.subscribe("reader@example.com").await.unwrap());
    }


    #[tokio::test]
    async fn test_failed_snapshot_write_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("data.json");

        let store = MemoryStore::open(&path).await.unwrap();
        let err = store
            .create_user(CreateUser::new("Alice", "alice@example.com", "h", Role::User))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.find_user_by_email("alice@example.com").await.unwrap().is_none());
        assert_eq!(store.count_users().await.unwrap(), 0);

        assert!(store.subscribe("reader@example.com").await.is_err());
        assert!(store.create_notice(new_notice("Sports Day", "event", None)).await.is_err());
        assert_eq!(store.count_notices().await.unwrap(), 0);

        // once the directory exists the same insert goes through
        std::fs::create_dir(dir.path().join("missing-subdir")).unwrap();
        store
            .create_user(CreateUser::new("Alice", "alice@example.com", "h", Role::User))
            .await
            .unwrap();
        assert!(store.subscribe("reader@example.com").await.unwrap());
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_keeps_previous_values() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();
        let path = data_dir.join("data.json");

        let store = MemoryStore::open(&path).await.unwrap();
        let user = store
            .create_user(CreateUser::new("Alice", "alice@example.com", "h", Role::User))
            .await
            .unwrap();
        let notice = store
            .create_notice(new_notice("Sports Day", "event", None))
            .await
            .unwrap();

        std::fs::remove_dir_all(&data_dir).unwrap();

        assert!(store.set_user_role(user.id, Role::Admin).await.is_err());
        assert_eq!(
            store.find_user_by_id(user.id).await.unwrap().unwrap().role,
            Role::User
        );
        assert!(store
            .set_notice_status(notice.id, NoticeStatus::Approved)
            .await
            .is_err());
        assert!(store.delete_notice(notice.id).await.is_err());
        let kept = store.find_notice(notice.id).await.unwrap().unwrap();
        assert_eq!(kept.status, NoticeStatus::Pending);
        assert!(store.delete_user(user.id).await.is_err());
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = MemoryStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
