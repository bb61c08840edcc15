use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub key_dir: PathBuf,
    /// `None` means any origin is allowed.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = var_or("PARLEY_PORT", "3000")
            .parse()
            .context("PARLEY_PORT must be a port number")?;

        Ok(Self {
            host: var_or("PARLEY_HOST", "0.0.0.0"),
            port,
            db_path: PathBuf::from(var_or("PARLEY_DB_PATH", "parley.db")),
            key_dir: PathBuf::from(var_or("PARLEY_KEY_DIR", "./config")),
            cors_origin: std::env::var("PARLEY_CORS_ORIGIN")
                .ok()
                .filter(|o| !o.trim().is_empty()),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
