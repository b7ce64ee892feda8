/*
 * Responsibility
 * - Read settings from the environment (identity endpoint, cache backend, timeouts)
 * - Validate them (startup fails when something required is missing)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Where validated tokens are cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCacheBackend {
    /// Validate on every request.
    Disabled,
    Memory,
    /// `redis://` or `rediss://` URL of a Valkey/Redis server.
    Valkey(String),
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub keystone_endpoint: Url,
    pub keystone_user_agent: String,
    pub keystone_timeout: Duration,

    pub token_cache: TokenCacheBackend,
    pub token_cache_time: Duration,
    pub token_cache_prefix: String,

    pub request_timeout: Duration,
}

pub const DEFAULT_USER_AGENT: &str = concat!("keystone-gate/", env!("CARGO_PKG_VERSION"));

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let keystone_endpoint = lookup("KEYSTONE_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("KEYSTONE_ENDPOINT"))?;
        let keystone_endpoint = Url::parse(keystone_endpoint.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or(ConfigError::Invalid("KEYSTONE_ENDPOINT"))?;

        let keystone_user_agent = lookup("KEYSTONE_USER_AGENT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let keystone_timeout = seconds(&lookup, "KEYSTONE_TIMEOUT_SECONDS", 5)?;
        if keystone_timeout.is_zero() {
            return Err(ConfigError::Invalid("KEYSTONE_TIMEOUT_SECONDS"));
        }

        let token_cache = match lookup("TOKEN_CACHE").map(|v| v.trim().to_string()) {
            None => TokenCacheBackend::Disabled,
            Some(v) if v.is_empty() || v.eq_ignore_ascii_case("none") => {
                TokenCacheBackend::Disabled
            }
            Some(v) if v.eq_ignore_ascii_case("memory") => TokenCacheBackend::Memory,
            Some(v) if v.starts_with("redis://") || v.starts_with("rediss://") => {
                TokenCacheBackend::Valkey(v)
            }
            Some(_) => return Err(ConfigError::Invalid("TOKEN_CACHE")),
        };

        // 0 falls back to the default, as an unset value does.
        let token_cache_time = match seconds(&lookup, "TOKEN_CACHE_SECONDS", 300)? {
            d if d.is_zero() => Duration::from_secs(300),
            d => d,
        };

        let token_cache_prefix = lookup("TOKEN_CACHE_PREFIX")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "keystone:token".to_string());

        let request_timeout = seconds(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            addr,
            app_env,
            keystone_endpoint,
            keystone_user_agent,
            keystone_timeout,
            token_cache,
            token_cache_time,
            token_cache_prefix,
            request_timeout,
        })
    }
}

fn seconds<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid(key)),
        None => Ok(Duration::from_secs(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_only_endpoint() {
        let config = config(&[("KEYSTONE_ENDPOINT", "https://keystone.example:5000/v3")]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.keystone_user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.keystone_timeout, Duration::from_secs(5));
        assert_eq!(config.token_cache, TokenCacheBackend::Disabled);
        assert_eq!(config.token_cache_time, Duration::from_secs(300));
        assert_eq!(config.token_cache_prefix, "keystone:token");
    }

    #[test]
    fn endpoint_is_required() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::Missing("KEYSTONE_ENDPOINT"))
        ));
        assert!(matches!(
            config(&[("KEYSTONE_ENDPOINT", "not a url")]),
            Err(ConfigError::Invalid("KEYSTONE_ENDPOINT"))
        ));
    }

    #[test]
    fn cache_backend_selection() {
        let memory = config(&[
            ("KEYSTONE_ENDPOINT", "http://localhost:5000/v3"),
            ("TOKEN_CACHE", "memory"),
        ])
        .unwrap();
        assert_eq!(memory.token_cache, TokenCacheBackend::Memory);

        let valkey = config(&[
            ("KEYSTONE_ENDPOINT", "http://localhost:5000/v3"),
            ("TOKEN_CACHE", "redis://localhost:6379"),
        ])
        .unwrap();
        assert_eq!(
            valkey.token_cache,
            TokenCacheBackend::Valkey("redis://localhost:6379".to_string())
        );

        assert!(matches!(
            config(&[
                ("KEYSTONE_ENDPOINT", "http://localhost:5000/v3"),
                ("TOKEN_CACHE", "memcached://localhost"),
            ]),
            Err(ConfigError::Invalid("TOKEN_CACHE"))
        ));
    }

    #[test]
    fn zero_cache_seconds_means_default() {
        let config = config(&[
            ("KEYSTONE_ENDPOINT", "http://localhost:5000/v3"),
            ("TOKEN_CACHE_SECONDS", "0"),
        ])
        .unwrap();

        assert_eq!(config.token_cache_time, Duration::from_secs(300));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(matches!(
            config(&[
                ("KEYSTONE_ENDPOINT", "http://localhost:5000/v3"),
                ("KEYSTONE_TIMEOUT_SECONDS", "soon"),
            ]),
            Err(ConfigError::Invalid("KEYSTONE_TIMEOUT_SECONDS"))
        ));
        assert!(matches!(
            config(&[("KEYSTONE_ENDPOINT", "http://localhost:5000/v3"), ("PORT", "x")]),
            Err(ConfigError::Invalid("PORT"))
        ));
    }
}
