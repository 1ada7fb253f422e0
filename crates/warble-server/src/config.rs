//! Runtime configuration, loaded once at startup from the environment
//! (optionally seeded by a `.env` file). The values feed the shared state
//! at construction; nothing reads the environment after this.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WARBLE_DB_PATH` | SQLite database file | `warble.db` |
//! | `WARBLE_SECRET_KEY` | session signing secret | `dev-secret-change-me` |
//! | `WARBLE_HOST` | bind address | `0.0.0.0` |
//! | `WARBLE_PORT` | bind port | `3000` |
//! | `WARBLE_PER_PAGE` | timeline page size | `30` |

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
    pub per_page: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("WARBLE_DB_PATH")
            .unwrap_or_else(|_| "warble.db".into())
            .into();
        let secret_key =
            std::env::var("WARBLE_SECRET_KEY").unwrap_or_else(|_| "dev-secret-change-me".into());
        let host = std::env::var("WARBLE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("WARBLE_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("WARBLE_PORT must be a port number")?;
        let per_page = std::env::var("WARBLE_PER_PAGE")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .context("WARBLE_PER_PAGE must be a positive integer")?;

        Ok(Self {
            db_path,
            secret_key,
            host,
            port,
            per_page,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("invalid WARBLE_HOST/WARBLE_PORT combination")
    }
}
