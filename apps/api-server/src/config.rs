//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use todo_infra::JwtConfig;

#[cfg(feature = "postgres")]
use todo_infra::DatabaseConfig;
#[cfg(feature = "rate-limit")]
use todo_infra::RateLimitConfig;
#[cfg(feature = "redis")]
use todo_infra::RedisConfig;

/// Which cache sits in front of task reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
    Disabled,
}

impl CacheBackend {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "redis" => Self::Redis,
            "none" | "off" | "disabled" => Self::Disabled,
            "memory" => Self::Memory,
            other => {
                tracing::warn!(value = %other, "Unknown CACHE_BACKEND, using in-memory cache");
                Self::Memory
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub ttl: Duration,
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
}

impl CacheSettings {
    fn from_env() -> Self {
        Self {
            backend: env::var("CACHE_BACKEND")
                .map(|v| CacheBackend::parse(&v))
                .unwrap_or(CacheBackend::Memory),
            ttl: Duration::from_secs(env_parse("CACHE_TTL_SECS").unwrap_or(300)),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
        }
    }
}

#[cfg(feature = "rate-limit")]
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub limits: RateLimitConfig,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub cache: CacheSettings,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations at startup.
    #[cfg(feature = "postgres")]
    pub auto_migrate: bool,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitSettings,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("PORT").unwrap_or(8000),
            cors_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| vec!["*".to_string()]),
            jwt: JwtConfig::from_env(),
            cache: CacheSettings::from_env(),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "postgres")]
            auto_migrate: env_flag("DB_AUTO_MIGRATE", true),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitSettings {
                enabled: env_flag("RATE_LIMIT_ENABLED", true),
                limits: RateLimitConfig::from_env(),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg_attr(not(any(feature = "postgres", feature = "rate-limit")), allow(dead_code))]
fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
