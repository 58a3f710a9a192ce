//! Runtime configuration, read from the environment with development defaults.
//!
//! - `CATALOGD_DB`: SQLite database file (default `catalog.sqlite3`)
//! - `CATALOGD_BIND`: listen host (default `127.0.0.1`)
//! - `PORT` or `CATALOGD_PORT`: listen port (default `3000`)
//! - `CATALOGD_IMAGE_DIR`: directory served under `/images/suppliers`
//!   (default `public/images/suppliers`)
//! - `CATALOGD_CORS_ORIGINS`: comma-separated allowed origins
//!   (`scheme://host[:port]`), empty allows any
//! - `CATALOGD_LOG_FORMAT`: `json` for JSON log lines, anything else for text

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::http::HeaderValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub image_dir: PathBuf,
    pub cors_origins: Vec<HeaderValue>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("catalog.sqlite3"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            image_dir: PathBuf::from("public/images/suppliers"),
            cors_origins: Vec::new(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = var("CATALOGD_DB").map(PathBuf::from).unwrap_or(defaults.db_path);
        let image_dir = var("CATALOGD_IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.image_dir);

        let host = var("CATALOGD_BIND").unwrap_or_else(|| "127.0.0.1".to_string());
        let port_str = var("PORT")
            .or_else(|| var("CATALOGD_PORT"))
            .unwrap_or_else(|| "3000".to_string());
        let port: u16 = port_str
            .parse()
            .with_context(|| format!("invalid port value: {}", port_str))?;
        let addr = format!("{}:{}", host, port);
        let bind_addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("invalid bind address: {}", addr))?;

        let cors_origins = match var("CATALOGD_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(parse_origin)
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let log_format = match var("CATALOGD_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            db_path,
            bind_addr,
            image_dir,
            cors_origins,
            log_format,
        })
    }
}

/// An allowed CORS origin: `http://` or `https://` followed by a bare host
/// with an optional port.
fn parse_origin(origin: &str) -> anyhow::Result<HeaderValue> {
    let host = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .unwrap_or_default();
    if host.is_empty() || host.contains(|c: char| c.is_whitespace() || c == '/') {
        anyhow::bail!("invalid CORS origin: {}", origin);
    }
    HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin: {}", origin))
}
