//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use surcharge_core::services::{PERCENTAGE_KEY, PercentageCacheConfig, RetryPolicy};
use surcharge_infra::database::DatabaseConfig;
use surcharge_infra::rate_limit::RateLimitConfig;

#[cfg(feature = "redis")]
use surcharge_infra::cache::RedisConfig;

/// Paths that bypass the token bucket: API docs and health checks.
pub const DEFAULT_ALLOWLIST: &[&str] = &[
    "/health",
    "/v3/api-docs",
    "/swagger-ui.html",
    "/webjars/swagger-ui/.+",
];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    /// Full-path patterns exempt from rate limiting.
    pub allowlist: Vec<String>,
    pub percentage: PercentageConfig,
    pub recorder: RecorderConfig,
}

/// Where the percentage comes from and how it is cached.
#[derive(Debug, Clone)]
pub struct PercentageConfig {
    pub cache: PercentageCacheConfig,
    /// Upstream service URL; `None` serves `fallback_value` instead.
    pub service_url: Option<String>,
    pub fallback_value: f64,
    /// Per-attempt upstream timeout.
    pub timeout: Duration,
}

impl Default for PercentageConfig {
    fn default() -> Self {
        Self {
            cache: PercentageCacheConfig::default(),
            service_url: None,
            fallback_value: 10.0,
            timeout: Duration::from_secs(2),
        }
    }
}

/// Call recorder tuning.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Minimum gap between two recorded 429 responses.
    pub suppression_window: Duration,
    /// Bodies larger than this are recorded by placeholder.
    pub max_body_bytes: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            suppression_window: Duration::from_secs(60),
            max_body_bytes: 64 * 1024,
        }
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let allowlist = env::var("RATE_LIMIT_ALLOWLIST")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|_| DEFAULT_ALLOWLIST.iter().map(|p| p.to_string()).collect());

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            allowlist,
            percentage: PercentageConfig::from_env(),
            recorder: RecorderConfig::from_env(),
        }
    }
}

impl PercentageConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retry_defaults = RetryPolicy::default();

        let cache = PercentageCacheConfig {
            key: env::var("PERCENTAGE_CACHE_KEY").unwrap_or_else(|_| PERCENTAGE_KEY.to_string()),
            ttl: parsed("PERCENTAGE_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache.ttl),
            retry: RetryPolicy {
                max_attempts: parsed("PERCENTAGE_MAX_ATTEMPTS")
                    .unwrap_or(retry_defaults.max_attempts),
                delay: parsed("PERCENTAGE_RETRY_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(retry_defaults.delay),
            },
            single_flight: flag("PERCENTAGE_SINGLE_FLIGHT").unwrap_or(false),
        };

        Self {
            cache,
            service_url: env::var("PERCENTAGE_SERVICE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            fallback_value: parsed("PERCENTAGE_FALLBACK_VALUE").unwrap_or(defaults.fallback_value),
            timeout: parsed("PERCENTAGE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }
}

impl RecorderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            suppression_window: parsed("RECORDER_SUPPRESSION_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.suppression_window),
            max_body_bytes: parsed("RECORDER_MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
        }
    }
}
