use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_URL: &str = "sqlite://kard.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub db_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_url: DEFAULT_DB_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads `KARD_PORT` and `KARD_DB_URL`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: try_load("KARD_PORT", DEFAULT_PORT),
            db_url: try_load("KARD_DB_URL", DEFAULT_DB_URL.to_string()),
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value `{raw}`: {e}, using default: {default}");
        default
    })
}
