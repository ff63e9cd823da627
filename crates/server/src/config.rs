use database::db::{ConfigError, DatabaseConfig};
use std::{env, net::SocketAddr};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Startup configuration, read once from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // also loads `.env`
        let database = DatabaseConfig::from_env()?;

        let raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: raw,
        })?;

        Ok(Self {
            bind_addr,
            database,
        })
    }
}
