//! Startup wiring
//!
//! Opens the configured store and runs the one-off data steps: bootstrap
//! admin and, when requested, demo content.

use anyhow::Context;
use noticehub_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    seed::{ensure_admin, seed_demo, AdminBootstrap},
    store::{MemoryStore, PgStore, Store},
};
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, StorageBackend};

/// Opens the store selected by `config`
///
/// The Postgres backend connects, then applies pending migrations.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .clone()
                .context("DATABASE_URL is required for the postgres backend")?;

            let pool = create_pool(DatabaseConfig {
                url,
                max_connections: config.storage.max_connections,
                ..Default::default()
            })
            .await
            .context("failed to connect to database")?;

            run_migrations(&pool)
                .await
                .context("failed to run migrations")?;

            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            let store = match &config.storage.data_file {
                Some(path) => MemoryStore::open(path)
                    .await
                    .with_context(|| format!("failed to open {}", path.display()))?,
                None => {
                    info!("Using ephemeral memory store");
                    MemoryStore::new()
                }
            };
            Ok(Arc::new(store))
        }
    }
}

/// Ensures the bootstrap admin exists and seeds demo data when enabled
pub async fn prepare_store(store: &dyn Store, config: &Config) -> anyhow::Result<()> {
    let today = chrono::Utc::now().date_naive();

    // Demo data first so an empty store gets the full demo set
    if config.storage.seed_demo {
        seed_demo(store, &config.password, today)
            .await
            .context("failed to seed demo data")?;
    }

    match ensure_admin(
        store,
        &config.admin.email,
        &config.admin.password,
        &config.password,
    )
    .await
    .context("failed to ensure admin account")?
    {
        AdminBootstrap::Created(user) => info!(email = %user.email, "Bootstrap admin created"),
        AdminBootstrap::AlreadyExists(user) if !user.role.is_admin() => tracing::warn!(
            email = %user.email,
            "Bootstrap admin email belongs to a non-admin account"
        ),
        AdminBootstrap::AlreadyExists(_) => {}
    }

    Ok(())
}
