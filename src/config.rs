//! Server configuration read from the environment.
//!
//!   DATABASE_URL        Postgres connection string (default: local diary-app)
//!   DATABASE_POOL_SIZE  max pool connections (default: 10)
//!   PORT                listen port (default: 3000)
//!   BIND_HOST           listen host (default: 0.0.0.0)
//!   STORAGE_BACKEND     `postgres` (default) or `memory`

use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::database::DatabaseConfig;

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost:5432/diary-app";
pub const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown STORAGE_BACKEND '{0}' (expected 'postgres' or 'memory')")]
    UnknownStorageBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownStorageBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database: DatabaseConfig,
    pub bind_host: String,
    pub port: u16,
    pub storage: StorageBackend,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let pool_size = lookup("DATABASE_POOL_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                warn!("Ignoring unparseable PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let bind_host = lookup("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let storage = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::Postgres,
        };

        Ok(Self {
            database: DatabaseConfig::new(database_url, pool_size),
            bind_host,
            port,
            storage,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}
