use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Where driver records are read from
#[derive(Clone, Debug, PartialEq)]
pub enum StoreConfig {
    Database { url: String },
    File { path: PathBuf },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub store: StoreConfig,
    pub server_host: String,
    pub server_port: u16,
    pub max_concurrent_requests: usize,
    /// Requests an IP may send back to back before throttling kicks in
    pub rate_limit_burst: u32,
    /// Milliseconds to regain one request slot
    pub rate_limit_replenish_ms: u64,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match (lookup("DATABASE_URL"), lookup("DRIVERS_FILE")) {
            (Some(url), _) => StoreConfig::Database { url },
            (None, Some(path)) => StoreConfig::File { path: path.into() },
            (None, None) => {
                return Err(AppError::Config(
                    "DATABASE_URL or DRIVERS_FILE must be set".to_string(),
                ));
            }
        };

        Ok(Self {
            store,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", 3000)?,
            max_concurrent_requests: parse_or(&lookup, "MAX_CONCURRENT_REQUESTS", 256)?,
            rate_limit_burst: parse_or(&lookup, "RATE_LIMIT_BURST", 100)?,
            rate_limit_replenish_ms: parse_or(&lookup, "RATE_LIMIT_REPLENISH_MS", 600)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> AppResult<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_driver_file() {
        let config = config_from(&[("DRIVERS_FILE", "drivers.json")]).unwrap();

        assert_eq!(
            config.store,
            StoreConfig::File {
                path: PathBuf::from("drivers.json")
            }
        );
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.max_concurrent_requests, 256);
        assert_eq!(config.rate_limit_burst, 100);
        assert_eq!(config.rate_limit_replenish_ms, 600);
    }

    #[test]
    fn test_database_takes_precedence() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/drivers"),
            ("DRIVERS_FILE", "drivers.json"),
            ("SERVER_PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(
            config.store,
            StoreConfig::Database {
                url: "postgres://localhost/drivers".to_string()
            }
        );
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn test_missing_store_is_an_error() {
        assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let err = config_from(&[("DRIVERS_FILE", "d.json"), ("SERVER_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }
}
