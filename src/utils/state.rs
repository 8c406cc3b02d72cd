use std::env;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::database::{PostStore, StoreError, memory::MemoryPostStore, posts::PgPostStore};
use crate::utils::snowflake::{MAX_SERVER_ID, SnowflakeGenerator};

pub const MEMORY_URL_SCHEME: &str = "memory://";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT: usize = 30 * 1024 * 1024;
const DEFAULT_CONNECTIONS: usize = 16;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("${0} missing")]
    Missing(&'static str),

    #[error("${name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `postgres://...` or `memory://`
    pub connection_url: String,
    pub port: u16,
    /// Max request body size in bytes
    pub body_limit: usize,
    pub connections: usize,
    pub server_id: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_url: MEMORY_URL_SCHEME.to_string(),
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
            connections: DEFAULT_CONNECTIONS,
            server_id: 0,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connection_url = lookup("CONNECTION_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("CONNECTION_URL"))?;

        let server_id: u8 = parse_var(&lookup, "SERVER_ID", 0)?;
        if server_id > MAX_SERVER_ID {
            return Err(ConfigError::Invalid {
                name: "SERVER_ID",
                value: server_id.to_string(),
            });
        }

        Ok(Self {
            connection_url,
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            body_limit: parse_var(&lookup, "BODY_LIMIT", DEFAULT_BODY_LIMIT)?,
            connections: parse_var(&lookup, "POSTGRES_CONNECTIONS", DEFAULT_CONNECTIONS)?,
            server_id,
        })
    }

    pub fn is_memory(&self) -> bool {
        self.connection_url.starts_with(MEMORY_URL_SCHEME)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub config: Arc<Config>,
}

#[derive(Error, Debug)]
pub enum AppStateError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppState {
    pub fn new(store: Arc<dyn PostStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub async fn create_from_env() -> Result<AppState, AppStateError> {
        let config = Config::from_env()?;
        Self::connect(config).await
    }

    /// Opens the store named by `config.connection_url`
    pub async fn connect(config: Config) -> Result<AppState, AppStateError> {
        let snowflake = SnowflakeGenerator::new(config.server_id, 0);

        let store: Arc<dyn PostStore> = if config.is_memory() {
            info!("Using in-memory post store");
            Arc::new(MemoryPostStore::new(snowflake))
        } else {
            Arc::new(
                PgPostStore::connect(&config.connection_url, config.connections, snowflake)
                    .await?,
            )
        };

        Ok(Self::new(store, config))
    }
}

pub type ArcAppState = Arc<AppState>;
