use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

/// Which [`TodoRepository`](crate::domain::repository::TodoRepository) backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind { Sqlite, Memory }

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown store {other:?}, expected \"sqlite\" or \"memory\""),
        }
    }
}

/// Server configuration read from the environment.
///
/// | Env Var              | Default             |
/// |----------------------|---------------------|
/// | `DATABASE_URL`       | `sqlite://todos.db` |
/// | `TODO_STORE`         | `sqlite`            |
/// | `HOST`               | `127.0.0.1`         |
/// | `PORT`               | `3000`              |
/// | `DB_MAX_CONNECTIONS` | `5`                 |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub store: StoreKind,
    pub addr: SocketAddr,
    pub max_connections: u32,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://todos.db".to_string());
        let store = parse_or(&lookup, "TODO_STORE", StoreKind::Sqlite)?;
        let host: IpAddr = parse_or(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        Ok(Self { database_url, store, addr: SocketAddr::new(host, port), max_connections })
    }
}

/// Base URL of the API the terminal client talks to (`TODO_API_URL`).
pub fn api_url_from_env() -> String {
    std::env::var("TODO_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| anyhow!("invalid {key}={raw:?}: {e}")),
    }
}
