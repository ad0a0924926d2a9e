// Settings read from the environment, with a .env file as a fallback.
use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::Context as _;

const DEFAULT_DATABASE_URL: &str = "sqlite://league.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    // Log to daily files in this directory instead of stderr.
    pub log_dir: Option<PathBuf>,
    pub admin: Option<AdminSeed>,
}

// The first admin, created when there are no users yet.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub token: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let admin = match (var("ADMIN_NAME"), var("ADMIN_EMAIL")) {
            (Some(name), Some(email)) => Some(AdminSeed { name, email, token: var("ADMIN_TOKEN") }),
            _ => None,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: bind_addr.parse().with_context(|| format!("BIND_ADDR {bind_addr} is not a socket address"))?,
            log_dir: var("LOG_DIR").map(PathBuf::from),
            admin,
        })
    }
}

// A set, non-empty variable.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
