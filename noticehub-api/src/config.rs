//! Configuration management for the API server
//!
//! Configuration comes from environment variables, with a `.env` file loaded
//! first when present. [`Config::from_lookup`] takes any key lookup so tests
//! can build a configuration without touching the process environment.
//!
//! # Environment Variables
//!
//! | Variable | Default |
//! |---|---|
//! | `API_HOST` | `0.0.0.0` |
//! | `API_PORT` | `10000` |
//! | `CORS_ORIGINS` | `*` (comma separated) |
//! | `PRODUCTION` | `false` |
//! | `PUBLIC_DIR` | unset |
//! | `STORAGE_BACKEND` | `postgres` if `DATABASE_URL` is set, else `memory` |
//! | `DATABASE_URL` | required for `postgres` |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `DATA_FILE` | unset (memory store is not persisted) |
//! | `SEED_DEMO_DATA` | `false` |
//! | `JWT_SECRET` | required, at least 32 characters |
//! | `JWT_TTL_DAYS` | `7` |
//! | `PASSWORD_MEMORY_KIB` / `PASSWORD_ITERATIONS` / `PASSWORD_PARALLELISM` | `65536` / `3` / `4` |
//! | `NOTICES_OPEN_SUBMISSION` | `false` |
//! | `SIGNUP_ALLOW_ADMIN` | `false` |
//! | `ADMIN_EMAIL` / `ADMIN_PASS` | `admin@gmail.com` / `Admin@123` |
//! | `LOG_FORMAT` | `text` (`json` for structured output) |
//!
//! # Example
//!
//! ```no_run
//! use noticehub_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use noticehub_shared::{
    auth::{jwt::DEFAULT_TTL_DAYS, password::HashParams},
    seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD},
};
use std::{env, fmt, path::PathBuf, str::FromStr};

const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub password: HashParams,
    pub policy: PolicyConfig,
    pub admin: AdminConfig,
    pub log_format: LogFormat,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed origins; `*` means any
    pub cors_origins: Vec<String>,

    /// Enables HSTS
    pub production: bool,

    /// Static front end served for unmatched GET requests
    pub public_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,

    /// JSON snapshot for the memory store
    pub data_file: Option<PathBuf>,

    /// Seed demo users and notices into an empty store
    pub seed_demo: bool,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing key
    ///
    /// Must be at least 32 characters. Generate with `openssl rand -hex 32`.
    pub secret: String,

    pub ttl_days: i64,
}

/// Switches that change who may do what
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyConfig {
    /// Any authenticated user may submit notices
    pub open_submission: bool,

    /// Signup honours a requested `admin` role
    pub signup_allow_admin: bool,
}

/// Bootstrap admin account
#[derive(Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&get, "API_PORT", 10000u16)?;
        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let database_url = get("DATABASE_URL");
        let backend = match get("STORAGE_BACKEND") {
            Some(v) => v.parse::<StorageBackend>().map_err(anyhow::Error::msg)?,
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };
        if backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable is required for the postgres backend");
        }

        let secret = get("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }
        let ttl_days = parse_or(&get, "JWT_TTL_DAYS", DEFAULT_TTL_DAYS)?;
        if ttl_days <= 0 {
            anyhow::bail!("JWT_TTL_DAYS must be positive");
        }

        let password = hash_params(&get)?;

        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            Some(f) if f == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production: flag(&get, "PRODUCTION"),
                public_dir: get("PUBLIC_DIR").map(PathBuf::from),
            },
            storage: StorageConfig {
                backend,
                database_url,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?,
                data_file: get("DATA_FILE").map(PathBuf::from),
                seed_demo: flag(&get, "SEED_DEMO_DATA"),
            },
            jwt: JwtConfig { secret, ttl_days },
            password,
            policy: PolicyConfig {
                open_submission: flag(&get, "NOTICES_OPEN_SUBMISSION"),
                signup_allow_admin: flag(&get, "SIGNUP_ALLOW_ADMIN"),
            },
            admin: admin_config(&get),
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.jwt.ttl_days)
    }
}

/// Settings for the `noticehub-migrate` tool
///
/// Only the database and the bootstrap admin matter here, so no JWT
/// secret is required.
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    pub database_url: String,
    pub password: HashParams,
    pub admin: AdminConfig,
}

impl MigrateConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        Ok(Self {
            database_url,
            password: hash_params(&get)?,
            admin: admin_config(&get),
        })
    }
}

fn hash_params<G>(get: &G) -> anyhow::Result<HashParams>
where
    G: Fn(&str) -> Option<String>,
{
    let defaults = HashParams::default();
    Ok(HashParams {
        memory_kib: parse_or(get, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
        iterations: parse_or(get, "PASSWORD_ITERATIONS", defaults.iterations)?,
        parallelism: parse_or(get, "PASSWORD_PARALLELISM", defaults.parallelism)?,
    })
}

fn admin_config<G>(get: &G) -> AdminConfig
where
    G: Fn(&str) -> Option<String>,
{
    AdminConfig {
        email: get("ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
        password: get("ADMIN_PASS").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn flag<G>(get: &G, key: &str) -> bool
where
    G: Fn(&str) -> Option<String>,
{
    matches!(
        get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}
