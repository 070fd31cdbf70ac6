//! Server configuration, read from the environment.
//!
//! - `TODO_HOST`: address to bind (default: 127.0.0.1)
//! - `TODO_PORT`, or `PORT` as a fallback: port to listen on (default: 3001)
//! - `TODO_DB_PATH`: SQLite database file (default: ./todos.db)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DB_PATH: &str = "todos.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Values that fail to
    /// parse fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = parse_or(lookup("TODO_HOST"), "TODO_HOST", defaults.host);
        let port = match lookup("TODO_PORT") {
            Some(raw) => parse_or(Some(raw), "TODO_PORT", defaults.port),
            None => parse_or(lookup("PORT"), "PORT", defaults.port),
        };
        let db_path = lookup("TODO_DB_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        Self {
            host,
            port,
            db_path,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }
    }
}
