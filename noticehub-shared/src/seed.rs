//! Admin bootstrap and demo data
//!
//! [`ensure_admin`] runs on every start so a fresh deployment always has an
//! account able to moderate. [`seed_demo`] only touches an empty store.

use chrono::{Months, NaiveDate};
use tracing::{debug, info};

use crate::auth::password::{hash_password, HashParams, PasswordError};
use crate::models::{
    notice::{CreateNotice, NoticeFields, NoticeStatus},
    user::{CreateUser, Role, User},
};
use crate::store::{Store, StoreError};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@gmail.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";
pub const DEFAULT_ADMIN_NAME: &str = "Admin User";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Result of [`ensure_admin`]
#[derive(Debug, Clone)]
pub enum AdminBootstrap {
    Created(User),
    AlreadyExists(User),
}

impl AdminBootstrap {
    pub fn user(&self) -> &User {
        match self {
            AdminBootstrap::Created(u) | AdminBootstrap::AlreadyExists(u) => u,
        }
    }
}

/// Creates the bootstrap admin unless an account with `email` exists
///
/// An existing account is left untouched, including its role.
pub async fn ensure_admin(
    store: &dyn Store,
    email: &str,
    password: &str,
    params: &HashParams,
) -> Result<AdminBootstrap, SeedError> {
    if let Some(existing) = store.find_user_by_email(email).await? {
        debug!(email = %existing.email, "Admin account already present");
        return Ok(AdminBootstrap::AlreadyExists(existing));
    }

    let password_hash = hash_password(password, params)?;
    let user = store
        .create_user(CreateUser::new(
            DEFAULT_ADMIN_NAME,
            email,
            password_hash,
            Role::Admin,
        ))
        .await?;

    info!(email = %user.email, "Admin account created");
    Ok(AdminBootstrap::Created(user))
}

struct DemoUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

struct DemoNotice {
    title: &'static str,
    content: &'static str,
    category: &'static str,
    author: &'static str,
    status: NoticeStatus,
}

const DEMO_USERS: [DemoUser; 2] = [
    DemoUser {
        name: "Alice Student",
        email: "alice@example.com",
        password: "User@123",
        role: Role::User,
    },
    DemoUser {
        name: "Bob Admin",
        email: "admin@example.com",
        password: "Admin@123",
        role: Role::Admin,
    },
];

const DEMO_NOTICES: [DemoNotice; 3] = [
    DemoNotice {
        title: "Midterm Examination Schedule",
        content: "Midterm schedule published.",
        category: "academic",
        author: "Academic Office",
        status: NoticeStatus::Approved,
    },
    DemoNotice {
        title: "Annual Sports Day",
        content: "Register for sports day.",
        category: "event",
        author: "Sports Committee",
        status: NoticeStatus::Approved,
    },
    DemoNotice {
        title: "Library Maintenance",
        content: "Library closed for renovation.",
        category: "administrative",
        author: "Library Dept",
        status: NoticeStatus::Pending,
    },
];

/// Fills an empty store with demo accounts and notices
///
/// Returns false without writing anything if the store already holds users
/// or notices. Demo notices expire one year after `today`.
pub async fn seed_demo(
    store: &dyn Store,
    params: &HashParams,
    today: NaiveDate,
) -> Result<bool, SeedError> {
    if store.count_users().await? > 0 || store.count_notices().await? > 0 {
        debug!("Store not empty, skipping demo data");
        return Ok(false);
    }

    for demo in &DEMO_USERS {
        let password_hash = hash_password(demo.password, params)?;
        store
            .create_user(CreateUser::new(demo.name, demo.email, password_hash, demo.role))
            .await?;
    }

    let expiry = today.checked_add_months(Months::new(12));
    for demo in &DEMO_NOTICES {
        let notice = store
            .create_notice(CreateNotice {
                fields: NoticeFields {
                    title: demo.title.to_string(),
                    content: demo.content.to_string(),
                    category: demo.category.to_string(),
                    expiry,
                },
                author: demo.author.to_string(),
                date: today,
            })
            .await?;

        if demo.status != NoticeStatus::Pending {
            store.set_notice_status(notice.id, demo.status).await?;
        }
    }

    info!(
        users = DEMO_USERS.len(),
        notices = DEMO_NOTICES.len(),
        "Demo data seeded"
    );
    Ok(true)
}
