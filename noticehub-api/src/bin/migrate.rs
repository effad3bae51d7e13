//! # NoticeHub migration tool
//!
//! Creates the database if needed, applies pending migrations and makes
//! sure the bootstrap admin account exists.
//!
//! ```bash
//! DATABASE_URL=postgresql://... cargo run -p noticehub-api --bin noticehub-migrate
//! ```

use anyhow::Context;
use noticehub_api::{config::MigrateConfig, telemetry};
use noticehub_shared::{
    db::{
        migrations::{ensure_database_exists, get_migration_status, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    seed::{ensure_admin, AdminBootstrap},
    store::PgStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init(telemetry::format_from_env());

    let config = MigrateConfig::from_env()?;
    let url = config.database_url.clone();

    ensure_database_exists(&url)
        .await
        .context("failed to create database")?;

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 2,
        ..Default::default()
    })
    .await
    .context("failed to connect to database")?;

    run_migrations(&pool).await?;
    let status = get_migration_status(&pool).await?;
    tracing::info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        up_to_date = status.is_up_to_date(),
        "Migration status"
    );

    let store = PgStore::new(pool.clone());
    match ensure_admin(
        &store,
        &config.admin.email,
        &config.admin.password,
        &config.password,
    )
    .await?
    {
        AdminBootstrap::Created(user) => tracing::info!(email = %user.email, "Admin created"),
        AdminBootstrap::AlreadyExists(user) => {
            tracing::info!(email = %user.email, "Admin already exists")
        }
    }

    close_pool(pool).await;
    Ok(())
}
