use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Dispensary";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "dispensary.db";
pub const DEFAULT_PASSWORD_COST: u32 = 12;
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "dispensary=info,dispensary_lib=info,tower_http=info"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

impl DatabaseLocation {
    /// Accepts a plain path, a `sqlite://` URL, or `:memory:`.
    pub fn parse(url: &str) -> Self {
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        if path == ":memory:" {
            Self::Memory
        } else {
            Self::File(PathBuf::from(path))
        }
    }
}

/// Runtime configuration, read from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseLocation,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub password_cost: u32,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = database_from_lookup(&lookup);

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let host = parse_or("HOST", &lookup, IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = parse_or("PORT", &lookup, DEFAULT_PORT)?;
        let password_cost = password_cost_from_lookup(&lookup)?;
        let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", &lookup, DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        Ok(Self {
            database,
            jwt_secret,
            host,
            port,
            password_cost,
            token_ttl_hours,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Database location alone, for maintenance commands that never sign tokens.
pub fn database_from_env() -> DatabaseLocation {
    database_from_lookup(&|key: &str| std::env::var(key).ok())
}

fn database_from_lookup<F>(lookup: &F) -> DatabaseLocation
where
    F: Fn(&str) -> Option<String>,
{
    DatabaseLocation::parse(
        &lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
    )
}

/// Password hash cost alone, validated the same way as for the server.
pub fn password_cost_from_env() -> Result<u32, ConfigError> {
    password_cost_from_lookup(&|key: &str| std::env::var(key).ok())
}

fn password_cost_from_lookup<F>(lookup: &F) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let cost = parse_or("PASSWORD_HASH_COST", lookup, DEFAULT_PASSWORD_COST)?;
    if !crate::crypto::password::COST_RANGE.contains(&cost) {
        return Err(ConfigError::Invalid {
            key: "PASSWORD_HASH_COST",
            value: cost.to_string(),
        });
    }
    Ok(cost)
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}
