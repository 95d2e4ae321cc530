use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Secret for signing list cursors. Random per process when unset.
    pub cursor_hmac_secret: Option<String>,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl PaginationConfig {
    pub const DEFAULT_PAGE_SIZE: i64 = 15;
    pub const MAX_PAGE_SIZE: i64 = 100;
    /// Upper bound accepted for `PAGE_SIZE_MAX`
    pub const PAGE_SIZE_CEILING: i64 = 1000;

    /// Keep configured sizes within `1..=PAGE_SIZE_CEILING`, with the default never above the max
    pub fn normalized(mut self) -> Self {
        self.max_page_size = self.max_page_size.clamp(1, Self::PAGE_SIZE_CEILING);
        self.default_page_size = self.default_page_size.clamp(1, self.max_page_size);
        self
    }

    /// Requested page size, or the default, clamped to `[1, max_page_size]`
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            cursor_hmac_secret: None,
            default_page_size: Self::DEFAULT_PAGE_SIZE,
            max_page_size: Self::MAX_PAGE_SIZE,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./disctracker.db".to_string());
        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", 5u32)?;

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = env_or("API_PORT", 3001u16)?;

        let cursor_hmac_secret = std::env::var("CURSOR_HMAC_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        let default_page_size = env_or("PAGE_SIZE_DEFAULT", PaginationConfig::DEFAULT_PAGE_SIZE)?;
        let max_page_size = env_or("PAGE_SIZE_MAX", PaginationConfig::MAX_PAGE_SIZE)?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            pagination: PaginationConfig {
                cursor_hmac_secret,
                default_page_size,
                max_page_size,
            }
            .normalized(),
        })
    }
}
